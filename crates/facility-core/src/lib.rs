//! Facility records, their durable store, and the facility-level service
//!
//! Combines the weather gateway with JSON-file persistence into the
//! create/update/delete/list operations the coordinator builds on.

pub mod error;
pub mod model;
pub mod service;
pub mod store;

pub use error::FacilityError;
pub use model::{Facility, Location, DEFAULT_TARGET_TEMPERATURE};
pub use service::FacilityService;
pub use store::FacilityStore;

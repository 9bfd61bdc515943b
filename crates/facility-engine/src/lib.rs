//! Stateful core of the facility dashboard
//!
//! Owns the in-memory facility collection and its loading/error flags,
//! initialization and seeding, the periodic weather-refresh schedule, and
//! bulk temperature-policy application. The UI layer consumes the state
//! snapshot and calls the coordinator's operations; it holds no state of
//! its own.

pub mod coordinator;
pub mod scheduler;
pub mod settings;

pub use coordinator::{CoordinatorEvent, DashboardState, FacilityCoordinator};
pub use scheduler::RefreshScheduler;
pub use settings::{
    select_preset, EnergySavingBands, SeasonalProfiles, SettingsStore, TemperaturePreset,
    TemperatureThresholds,
};

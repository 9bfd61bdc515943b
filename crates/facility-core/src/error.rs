//! Error types for facility operations

use thiserror::Error;
use weather_gateway::GatewayError;

/// Errors that can occur in the facility service and coordinator
#[derive(Error, Debug)]
pub enum FacilityError {
    /// Facility id absent from the persisted list
    #[error("Facility not found: {0}")]
    NotFound(String),

    /// Create would violate the (city, state) uniqueness invariant
    #[error("Facility already exists for {city} {state}")]
    DuplicateFacility { city: String, state: String },

    /// Weather or geocoding lookup failed
    #[error("Weather lookup failed: {0}")]
    Weather(#[from] GatewayError),

    /// Stored facility data could not be written
    #[error("Persistence error: {0}")]
    Persistence(#[from] std::io::Error),
}

//! Error types for the weather gateway

use thiserror::Error;

/// Errors that can occur talking to the weather provider
#[derive(Error, Debug)]
pub enum GatewayError {
    /// No API credential configured
    #[error("OpenWeather API key is not configured")]
    MissingApiKey,

    /// Geocoding returned zero matches
    #[error("City not found: {0}")]
    CityNotFound(String),

    /// Non-success response from the provider
    #[error("Upstream error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(reqwest::Error),

    /// No popular-cities source configured or reachable
    #[error("Popular-cities seed source unavailable")]
    SeedUnavailable,
}

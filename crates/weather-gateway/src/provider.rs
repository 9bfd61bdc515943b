//! Trait boundary between the facility layers and the weather provider

use crate::error::GatewayError;
use crate::model::{CurrentWeather, GeocodedPlace, SeedCity};
use async_trait::async_trait;

/// Weather lookups the facility service depends on.
///
/// Implemented by [`crate::WeatherGateway`] against the real provider; tests
/// substitute their own implementations.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch current conditions for a coordinate pair
    async fn fetch_current_weather(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<CurrentWeather, GatewayError>;

    /// Resolve a city name (optionally scoped to a US state) to coordinates
    async fn resolve_city(
        &self,
        city: &str,
        state_code: Option<&str>,
    ) -> Result<GeocodedPlace, GatewayError>;

    /// Best-effort lookup of a popular-cities seed list. Callers fall back
    /// to a built-in list on any error.
    async fn fetch_popular_cities(&self) -> Result<Vec<SeedCity>, GatewayError> {
        Err(GatewayError::SeedUnavailable)
    }
}

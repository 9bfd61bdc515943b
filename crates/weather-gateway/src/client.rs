//! HTTP client for the OpenWeather API

use crate::error::GatewayError;
use crate::model::{CurrentWeather, GeocodedPlace, SeedCity};
use crate::provider::WeatherProvider;
use async_trait::async_trait;
use reqwest::{Client, Response};

const WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const GEOCODING_BASE_URL: &str = "https://api.openweathermap.org/geo/1.0";

/// Units parameter sent on every weather request (Celsius)
const UNITS: &str = "metric";

/// Gateway configuration, injected at construction
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// OpenWeather API credential
    pub api_key: String,
    /// Base URL for current-conditions requests
    pub weather_base_url: String,
    /// Base URL for geocoding requests
    pub geocoding_base_url: String,
    /// Optional URL serving a JSON popular-cities seed list
    pub popular_cities_url: Option<String>,
}

impl GatewayConfig {
    /// Configuration against the real OpenWeather endpoints
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            weather_base_url: WEATHER_BASE_URL.to_string(),
            geocoding_base_url: GEOCODING_BASE_URL.to_string(),
            popular_cities_url: None,
        }
    }
}

/// HTTP client for current weather and geocoding lookups.
///
/// Pure request/response: no retries, no caching. Callers decide how to
/// handle failures.
pub struct WeatherGateway {
    config: GatewayConfig,
    http_client: Client,
}

impl WeatherGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            http_client: Client::new(),
        }
    }

    fn api_key(&self) -> Result<&str, GatewayError> {
        if self.config.api_key.is_empty() {
            return Err(GatewayError::MissingApiKey);
        }
        Ok(&self.config.api_key)
    }
}

#[async_trait]
impl WeatherProvider for WeatherGateway {
    async fn fetch_current_weather(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<CurrentWeather, GatewayError> {
        let api_key = self.api_key()?;
        let url = format!("{}/weather", self.config.weather_base_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("units", UNITS.to_string()),
                ("appid", api_key.to_string()),
            ])
            .send()
            .await?;

        let response = check_status(response).await?;
        response
            .json::<CurrentWeather>()
            .await
            .map_err(GatewayError::Decode)
    }

    async fn resolve_city(
        &self,
        city: &str,
        state_code: Option<&str>,
    ) -> Result<GeocodedPlace, GatewayError> {
        let api_key = self.api_key()?;
        let url = format!("{}/direct", self.config.geocoding_base_url);

        // A state code scopes the search to US cities; without one the query
        // is unscoped so non-US cities resolve too.
        let query = match state_code {
            Some(state) => format!("{city},{state},US"),
            None => city.to_string(),
        };

        let response = self
            .http_client
            .get(&url)
            .query(&[("q", query.as_str()), ("limit", "1"), ("appid", api_key)])
            .send()
            .await?;

        let response = check_status(response).await?;
        let matches = response
            .json::<Vec<GeocodedPlace>>()
            .await
            .map_err(GatewayError::Decode)?;

        matches
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::CityNotFound(city.to_string()))
    }

    /// Fetch the configured seed list; `SeedUnavailable` when no source is
    /// configured.
    async fn fetch_popular_cities(&self) -> Result<Vec<SeedCity>, GatewayError> {
        let url = self
            .config
            .popular_cities_url
            .as_deref()
            .ok_or(GatewayError::SeedUnavailable)?;

        let response = self.http_client.get(url).send().await?;
        let response = check_status(response).await?;
        response
            .json::<Vec<SeedCity>>()
            .await
            .map_err(GatewayError::Decode)
    }
}

/// Turn a non-2xx response into an `Upstream` error carrying status and body
async fn check_status(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!("Upstream returned {}: {}", status, body);
    Err(GatewayError::Upstream {
        status: status.as_u16(),
        body,
    })
}

//! Response models for the OpenWeather endpoints
//!
//! Only the fields the dashboard consumes are modeled; unknown provider
//! fields are ignored on deserialization.

use serde::{Deserialize, Serialize};

/// Current weather conditions for one location, as returned by the
/// `/data/2.5/weather` endpoint (metric units). Replaced wholesale on every
/// refresh, never merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub main: WeatherMain,
    #[serde(default)]
    pub wind: Wind,
    #[serde(default)]
    pub clouds: Clouds,
    /// Condition list; the provider sends at least one entry
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    #[serde(default)]
    pub sys: WeatherSys,
    /// Shift in seconds from UTC at the observed location
    #[serde(default)]
    pub timezone: i64,
    /// Observation time, UTC seconds
    #[serde(default)]
    pub dt: i64,
    /// Place name as the provider knows it
    #[serde(default)]
    pub name: String,
}

/// Core temperature readings, degrees Celsius
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherMain {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: f64,
    /// Relative humidity, percent
    #[serde(default)]
    pub humidity: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Wind {
    /// Wind speed, m/s
    #[serde(default)]
    pub speed: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Clouds {
    /// Cloud cover, percent
    #[serde(default)]
    pub all: f64,
}

/// One condition entry (code plus human-readable description)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub id: i64,
    pub main: String,
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherSys {
    /// Sunrise, UTC seconds
    #[serde(default)]
    pub sunrise: i64,
    /// Sunset, UTC seconds
    #[serde(default)]
    pub sunset: i64,
    #[serde(default)]
    pub country: String,
}

/// One geocoding match from the `/geo/1.0/direct` endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeocodedPlace {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: String,
    /// Present for US results, absent for most non-US places
    #[serde(default)]
    pub state: Option<String>,
}

/// Entry in an externally hosted popular-cities seed list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedCity {
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
}

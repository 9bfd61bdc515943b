//! Outbound gateway to the OpenWeather API
//!
//! Wraps the current-conditions-by-coordinates and geocoding-by-place-name
//! endpoints behind a small client, plus the `WeatherProvider` trait the
//! facility layers depend on. Pure request/response, no state.

pub mod client;
pub mod error;
pub mod model;
pub mod provider;

pub use client::{GatewayConfig, WeatherGateway};
pub use error::GatewayError;
pub use model::*;
pub use provider::WeatherProvider;

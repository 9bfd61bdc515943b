//! Environment-driven server configuration

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration resolved once at startup.
///
/// A missing API credential is a startup error here, not a per-request one.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// OpenWeather API credential
    pub api_key: String,
    /// Directory holding the facility and settings records
    pub data_dir: PathBuf,
    /// Listen address
    pub bind_addr: SocketAddr,
    /// Optional URL serving the popular-cities seed list
    pub popular_cities_url: Option<String>,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENWEATHER_API_KEY")
            .context("OPENWEATHER_API_KEY must be set")?;
        if api_key.is_empty() {
            anyhow::bail!("OPENWEATHER_API_KEY must not be empty");
        }

        let data_dir = std::env::var("FACILITY_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .context("BIND_ADDR must be a valid socket address")?;

        let popular_cities_url = std::env::var("POPULAR_CITIES_URL").ok();

        Ok(Self {
            api_key,
            data_dir,
            bind_addr,
            popular_cities_url,
        })
    }
}

//! Global temperature policy settings and their write-through store
//!
//! Four independently persisted groups: presets, thresholds, seasonal
//! profiles, and energy-saving bands. Each group is one JSON record, read
//! once at startup and rewritten in full on every change.

use chrono::Weekday;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

const PRESETS_FILE: &str = "temperature_presets.json";
const THRESHOLDS_FILE: &str = "temperature_thresholds.json";
const PROFILES_FILE: &str = "seasonal_profiles.json";
const BANDS_FILE: &str = "energy_saving_bands.json";

/// Default target temperatures by time bucket, degrees Celsius
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperaturePreset {
    pub day: f64,
    pub night: f64,
    pub weekend: f64,
}

impl TemperaturePreset {
    const fn of(day: f64, night: f64, weekend: f64) -> Self {
        Self { day, night, weekend }
    }
}

impl Default for TemperaturePreset {
    fn default() -> Self {
        Self::of(22.0, 18.0, 20.0)
    }
}

/// Soft operating bounds plus whether out-of-band alerts are surfaced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureThresholds {
    pub min: f64,
    pub max: f64,
    pub alert_enabled: bool,
}

impl Default for TemperatureThresholds {
    fn default() -> Self {
        Self {
            min: 16.0,
            max: 28.0,
            alert_enabled: true,
        }
    }
}

/// Per-season preset table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalProfiles {
    pub winter: TemperaturePreset,
    pub spring: TemperaturePreset,
    pub summer: TemperaturePreset,
    pub fall: TemperaturePreset,
}

impl Default for SeasonalProfiles {
    fn default() -> Self {
        Self {
            winter: TemperaturePreset::of(21.0, 17.0, 19.0),
            spring: TemperaturePreset::of(22.0, 18.0, 20.0),
            summer: TemperaturePreset::of(24.0, 20.0, 22.0),
            fall: TemperaturePreset::of(22.0, 18.0, 20.0),
        }
    }
}

/// Peak/off-peak presets for energy saving, disabled by default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergySavingBands {
    pub peak_hours: TemperaturePreset,
    pub off_peak_hours: TemperaturePreset,
    pub enabled: bool,
}

impl Default for EnergySavingBands {
    fn default() -> Self {
        Self {
            peak_hours: TemperaturePreset::of(24.0, 20.0, 22.0),
            off_peak_hours: TemperaturePreset::of(20.0, 18.0, 19.0),
            enabled: false,
        }
    }
}

/// Pick the preset bucket for a local weekday and hour: weekend on
/// Saturday/Sunday, day for hours in [8, 20), night otherwise.
pub fn select_preset(presets: &TemperaturePreset, weekday: Weekday, hour: u32) -> f64 {
    if matches!(weekday, Weekday::Sat | Weekday::Sun) {
        presets.weekend
    } else if (8..20).contains(&hour) {
        presets.day
    } else {
        presets.night
    }
}

/// Holds the four policy groups, persisting every change immediately.
pub struct SettingsStore {
    data_dir: PathBuf,
    presets: RwLock<TemperaturePreset>,
    thresholds: RwLock<TemperatureThresholds>,
    profiles: RwLock<SeasonalProfiles>,
    bands: RwLock<EnergySavingBands>,
}

impl SettingsStore {
    /// Load all groups from `data_dir`, falling back to defaults per group
    /// when a record is missing or corrupt.
    pub async fn load(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            presets: RwLock::new(load_group(&data_dir.join(PRESETS_FILE)).await),
            thresholds: RwLock::new(load_group(&data_dir.join(THRESHOLDS_FILE)).await),
            profiles: RwLock::new(load_group(&data_dir.join(PROFILES_FILE)).await),
            bands: RwLock::new(load_group(&data_dir.join(BANDS_FILE)).await),
        }
    }

    pub async fn temperature_presets(&self) -> TemperaturePreset {
        self.presets.read().await.clone()
    }

    pub async fn set_temperature_presets(
        &self,
        presets: TemperaturePreset,
    ) -> Result<(), std::io::Error> {
        save_group(&self.data_dir.join(PRESETS_FILE), &presets).await?;
        *self.presets.write().await = presets;
        Ok(())
    }

    pub async fn temperature_thresholds(&self) -> TemperatureThresholds {
        self.thresholds.read().await.clone()
    }

    pub async fn set_temperature_thresholds(
        &self,
        thresholds: TemperatureThresholds,
    ) -> Result<(), std::io::Error> {
        save_group(&self.data_dir.join(THRESHOLDS_FILE), &thresholds).await?;
        *self.thresholds.write().await = thresholds;
        Ok(())
    }

    pub async fn seasonal_profiles(&self) -> SeasonalProfiles {
        self.profiles.read().await.clone()
    }

    pub async fn set_seasonal_profiles(
        &self,
        profiles: SeasonalProfiles,
    ) -> Result<(), std::io::Error> {
        save_group(&self.data_dir.join(PROFILES_FILE), &profiles).await?;
        *self.profiles.write().await = profiles;
        Ok(())
    }

    pub async fn energy_saving_bands(&self) -> EnergySavingBands {
        self.bands.read().await.clone()
    }

    pub async fn set_energy_saving_bands(
        &self,
        bands: EnergySavingBands,
    ) -> Result<(), std::io::Error> {
        save_group(&self.data_dir.join(BANDS_FILE), &bands).await?;
        *self.bands.write().await = bands;
        Ok(())
    }
}

/// Load one settings group, defaulting on absence or parse failure
async fn load_group<T: DeserializeOwned + Default>(path: &Path) -> T {
    match fs::read_to_string(path).await {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(group) => group,
            Err(e) => {
                tracing::warn!("Failed to parse settings file {:?}: {}", path, e);
                T::default()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => T::default(),
        Err(e) => {
            tracing::warn!("Failed to read settings file {:?}: {}", path, e);
            T::default()
        }
    }
}

/// Persist one settings group atomically (temp file + rename)
async fn save_group<T: Serialize>(path: &Path, group: &T) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_string_pretty(group)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &json).await?;
    fs::rename(&tmp_path, path).await?;

    tracing::debug!("Saved settings group {:?}", path);
    Ok(())
}

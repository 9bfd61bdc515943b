//! Facility persistence using JSON file storage
//!
//! One named record holds the serialized facility array; an absent record is
//! a valid empty state, and malformed entries are dropped rather than
//! surfaced as errors.

use crate::model::Facility;
use std::path::{Path, PathBuf};
use tokio::fs;

const STORE_FILE: &str = "facilities.json";

/// Durable key-value store for the facility list. No network awareness.
pub struct FacilityStore {
    path: PathBuf,
}

impl FacilityStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(STORE_FILE),
        }
    }

    /// Load the persisted list, or an empty list if none exists.
    ///
    /// Malformed entries are filtered out with a warning; an unreadable or
    /// unparseable file is treated as absence.
    pub async fn load(&self) -> Vec<Facility> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No facilities file at {:?}, starting fresh", self.path);
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!("Failed to read facilities file {:?}: {}", self.path, e);
                return Vec::new();
            }
        };

        let entries = match serde_json::from_str::<Vec<serde_json::Value>>(&contents) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Failed to parse facilities file {:?}: {}", self.path, e);
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<Facility>(entry) {
                Ok(facility) => Some(facility),
                Err(e) => {
                    tracing::warn!("Dropping malformed facility entry: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Overwrite the persisted list atomically (full replace, not merge)
    pub async fn save(&self, facilities: &[Facility]) -> Result<(), std::io::Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(facilities)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        // Write atomically: write to temp file, then rename
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, &json).await?;
        fs::rename(&tmp_path, &self.path).await?;

        tracing::debug!("Saved {} facilities to {:?}", facilities.len(), self.path);
        Ok(())
    }

    /// Remove all persisted facility data. Idempotent.
    pub async fn clear(&self) -> Result<(), std::io::Error> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Location;

    fn facility(id: &str, city: &str) -> Facility {
        Facility {
            id: id.to_string(),
            name: format!("{city} Facility"),
            location: Location {
                city: city.to_string(),
                state: "CA".to_string(),
                latitude: 37.77,
                longitude: -122.42,
            },
            target_temperature: 22.0,
            weather: None,
        }
    }

    #[tokio::test]
    async fn load_without_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FacilityStore::new(dir.path());
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FacilityStore::new(dir.path());

        store
            .save(&[facility("a", "San Francisco"), facility("b", "Oakland")])
            .await
            .unwrap();

        let loaded = store.load().await;
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].location.city, "San Francisco");
        assert_eq!(loaded[1].id, "b");
    }

    #[tokio::test]
    async fn malformed_entries_are_dropped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facilities.json");
        std::fs::write(
            &path,
            r#"[
                {"id": "a", "name": "SF Facility",
                 "location": {"city": "San Francisco", "state": "CA",
                              "latitude": 37.77, "longitude": -122.42},
                 "targetTemperature": 22.0, "weather": null},
                {"bogus": true}
            ]"#,
        )
        .unwrap();

        let store = FacilityStore::new(dir.path());
        let loaded = store.load().await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "a");
    }

    #[tokio::test]
    async fn garbage_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("facilities.json"), "not json").unwrap();

        let store = FacilityStore::new(dir.path());
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FacilityStore::new(dir.path());

        store.save(&[facility("a", "San Francisco")]).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.load().await.is_empty());

        // Second clear with nothing persisted still succeeds
        store.clear().await.unwrap();
    }
}

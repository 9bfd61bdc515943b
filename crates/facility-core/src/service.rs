//! Facility-level operations combining the weather gateway and the store

use crate::error::FacilityError;
use crate::model::Facility;
use crate::store::FacilityStore;
use futures::future::join_all;
use std::sync::Arc;
use weather_gateway::WeatherProvider;

/// Create/update/delete/list operations over the persisted facility list,
/// enforcing per-facility invariants. Stateless itself; the store, not
/// memory, is the durable source of truth.
pub struct FacilityService {
    store: FacilityStore,
    provider: Arc<dyn WeatherProvider>,
}

impl FacilityService {
    pub fn new(store: FacilityStore, provider: Arc<dyn WeatherProvider>) -> Self {
        Self { store, provider }
    }

    pub fn store(&self) -> &FacilityStore {
        &self.store
    }

    /// The persisted list as-is, no weather refresh
    pub async fn list(&self) -> Vec<Facility> {
        self.store.load().await
    }

    /// The persisted list with a freshly fetched snapshot per facility.
    ///
    /// Fetches run concurrently; a failed fetch keeps the facility's prior
    /// snapshot (or None) rather than dropping it from the result. Refreshed
    /// weather is not written back to the store.
    pub async fn list_with_fresh_weather(&self) -> Vec<Facility> {
        let facilities = self.store.load().await;
        if facilities.is_empty() {
            return facilities;
        }

        let refreshes = facilities.into_iter().map(|mut facility| async move {
            match self
                .provider
                .fetch_current_weather(facility.location.latitude, facility.location.longitude)
                .await
            {
                Ok(weather) => facility.weather = Some(weather),
                Err(e) => {
                    tracing::warn!(
                        "Failed to refresh weather for {}: {}",
                        facility.location.city,
                        e
                    );
                }
            }
            facility
        });

        join_all(refreshes).await
    }

    /// Resolve a city, fetch its initial weather, and persist a new facility.
    ///
    /// Fails with `DuplicateFacility` when a facility for the same
    /// (city, state) pair already exists, city compared case-insensitively.
    pub async fn create(
        &self,
        city: &str,
        state_code: Option<&str>,
    ) -> Result<Facility, FacilityError> {
        let place = self.provider.resolve_city(city, state_code).await?;
        let weather = self
            .provider
            .fetch_current_weather(place.lat, place.lon)
            .await?;

        let facility = Facility::from_place(&place, state_code, weather);

        let mut facilities = self.store.load().await;
        let duplicate = facilities
            .iter()
            .any(|f| f.is_same_place(&facility.location.city, &facility.location.state));
        if duplicate {
            return Err(FacilityError::DuplicateFacility {
                city: facility.location.city,
                state: facility.location.state,
            });
        }

        facilities.push(facility.clone());
        self.store.save(&facilities).await?;

        tracing::info!(
            "Created facility {} ({}, {})",
            facility.id,
            facility.location.city,
            facility.location.state
        );
        Ok(facility)
    }

    /// Replace a facility's target temperature and return it with a fresh
    /// weather snapshot.
    ///
    /// The re-fetch keeps the returned composite current; it happens after
    /// the temperature was persisted, so a fetch failure propagates with the
    /// write already committed.
    pub async fn update_temperature(
        &self,
        id: &str,
        temperature: f64,
    ) -> Result<Facility, FacilityError> {
        let mut facilities = self.store.load().await;
        let index = facilities
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| FacilityError::NotFound(id.to_string()))?;

        facilities[index].target_temperature = temperature;
        self.store.save(&facilities).await?;

        let mut updated = facilities.swap_remove(index);
        let weather = self
            .provider
            .fetch_current_weather(updated.location.latitude, updated.location.longitude)
            .await?;
        updated.weather = Some(weather);

        tracing::info!(
            "Set target temperature {:.1} for facility {}",
            temperature,
            id
        );
        Ok(updated)
    }

    /// Remove a facility from the persisted list. Idempotent: an absent id
    /// is not an error.
    pub async fn delete(&self, id: &str) -> Result<(), FacilityError> {
        let mut facilities = self.store.load().await;
        let before = facilities.len();
        facilities.retain(|f| f.id != id);

        self.store.save(&facilities).await?;

        if facilities.len() < before {
            tracing::info!("Deleted facility {}", id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use weather_gateway::{CurrentWeather, GatewayError, GeocodedPlace, WeatherMain};

    /// Provider stub: coordinates derive from the city name length so each
    /// city gets a stable, distinct location. The knobs are interior-mutable
    /// so tests can change behavior between calls.
    #[derive(Default)]
    struct MockProvider {
        /// Temperature reported by every successful fetch
        temp: std::sync::Mutex<f64>,
        /// Fetches for this latitude fail with an upstream-shaped error
        fail_lat: std::sync::Mutex<Option<f64>>,
        /// Cities that geocode to zero matches
        unknown_cities: Vec<String>,
    }

    impl MockProvider {
        fn with_temp(temp: f64) -> Self {
            let provider = Self::default();
            provider.set_temp(temp);
            provider
        }

        fn set_temp(&self, temp: f64) {
            *self.temp.lock().unwrap() = temp;
        }

        fn set_fail_lat(&self, lat: Option<f64>) {
            *self.fail_lat.lock().unwrap() = lat;
        }
    }

    #[async_trait]
    impl WeatherProvider for MockProvider {
        async fn fetch_current_weather(
            &self,
            lat: f64,
            _lon: f64,
        ) -> Result<CurrentWeather, GatewayError> {
            if *self.fail_lat.lock().unwrap() == Some(lat) {
                return Err(GatewayError::Upstream {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            Ok(CurrentWeather {
                main: WeatherMain {
                    temp: *self.temp.lock().unwrap(),
                    ..Default::default()
                },
                ..Default::default()
            })
        }

        async fn resolve_city(
            &self,
            city: &str,
            state_code: Option<&str>,
        ) -> Result<GeocodedPlace, GatewayError> {
            if self.unknown_cities.iter().any(|c| c == city) {
                return Err(GatewayError::CityNotFound(city.to_string()));
            }
            Ok(GeocodedPlace {
                name: city.to_string(),
                lat: city.len() as f64,
                lon: -(city.len() as f64),
                country: "US".to_string(),
                state: state_code.map(str::to_string),
            })
        }
    }

    fn service_with(provider: MockProvider) -> (FacilityService, Arc<MockProvider>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = FacilityStore::new(dir.path());
        let provider = Arc::new(provider);
        (
            FacilityService::new(store, provider.clone()),
            provider,
            dir,
        )
    }

    #[tokio::test]
    async fn create_persists_with_default_target() {
        let (service, _provider, _dir) = service_with(MockProvider::with_temp(15.0));

        let facility = service.create("Portland", Some("OR")).await.unwrap();
        assert_eq!(facility.name, "Portland Facility");
        assert_eq!(facility.target_temperature, 22.0);
        assert_eq!(facility.weather.as_ref().unwrap().main.temp, 15.0);

        let persisted = service.list().await;
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].id, facility.id);
    }

    #[tokio::test]
    async fn duplicate_create_fails_and_keeps_one_record() {
        let (service, _provider, _dir) = service_with(MockProvider::default());

        service.create("Portland", Some("OR")).await.unwrap();
        let err = service.create("portland", Some("OR")).await.unwrap_err();

        assert!(matches!(err, FacilityError::DuplicateFacility { .. }));
        assert_eq!(service.list().await.len(), 1);
    }

    #[tokio::test]
    async fn unresolvable_city_propagates_not_found() {
        let (service, _provider, _dir) = service_with(MockProvider {
            unknown_cities: vec!["Atlantis".to_string()],
            ..Default::default()
        });

        let err = service.create("Atlantis", None).await.unwrap_err();
        assert!(matches!(
            err,
            FacilityError::Weather(GatewayError::CityNotFound(_))
        ));
        assert!(service.list().await.is_empty());
    }

    #[tokio::test]
    async fn update_temperature_unknown_id_leaves_store_unchanged() {
        let (service, _provider, _dir) = service_with(MockProvider::default());
        let facility = service.create("Portland", Some("OR")).await.unwrap();

        let err = service.update_temperature("no-such-id", 25.0).await.unwrap_err();
        assert!(matches!(err, FacilityError::NotFound(_)));

        let persisted = service.list().await;
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].target_temperature, facility.target_temperature);
    }

    #[tokio::test]
    async fn update_temperature_persists_and_returns_fresh_weather() {
        let (service, provider, _dir) = service_with(MockProvider::with_temp(9.5));
        let facility = service.create("Portland", Some("OR")).await.unwrap();

        // The composite returned by the update must carry the re-fetched
        // reading, not the one taken at creation
        provider.set_temp(11.5);

        let updated = service.update_temperature(&facility.id, 19.0).await.unwrap();
        assert_eq!(updated.target_temperature, 19.0);
        assert_eq!(updated.weather.as_ref().unwrap().main.temp, 11.5);

        let persisted = service.list().await;
        assert_eq!(persisted[0].target_temperature, 19.0);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (service, _provider, _dir) = service_with(MockProvider::default());
        let facility = service.create("Portland", Some("OR")).await.unwrap();

        service.delete(&facility.id).await.unwrap();
        assert!(service.list().await.is_empty());

        // Same id again, and an id never present: both succeed
        service.delete(&facility.id).await.unwrap();
        service.delete("never-existed").await.unwrap();
        assert!(service.list().await.is_empty());
    }

    #[tokio::test]
    async fn partial_refresh_failure_keeps_all_facilities() {
        let (service, provider, _dir) = service_with(MockProvider::with_temp(12.0));

        let portland = service.create("Portland", Some("OR")).await.unwrap();
        service.create("Boise", Some("ID")).await.unwrap();

        // "Portland" geocodes to lat 8.0 (name length); fail only its fetch
        provider.set_fail_lat(Some(8.0));
        provider.set_temp(30.0);

        let refreshed = service.list_with_fresh_weather().await;
        assert_eq!(refreshed.len(), 2);

        let stale = refreshed.iter().find(|f| f.id == portland.id).unwrap();
        let fresh = refreshed.iter().find(|f| f.id != portland.id).unwrap();

        // The failing facility retains the snapshot taken at creation
        assert_eq!(stale.weather.as_ref().unwrap().main.temp, 12.0);
        assert_eq!(fresh.weather.as_ref().unwrap().main.temp, 30.0);
    }
}

//! The stateful facility coordinator

use crate::scheduler::RefreshScheduler;
use crate::settings::{select_preset, TemperaturePreset};
use chrono::{Datelike, Local, Timelike};
use facility_core::{Facility, FacilityError, FacilityService, DEFAULT_TARGET_TEMPERATURE};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use weather_gateway::{SeedCity, WeatherProvider};

/// Period of the background weather refresh
const REFRESH_INTERVAL: Duration = Duration::from_secs(300);

/// Seed list used when the store is empty and no external popular-cities
/// source answers. Once the fallback is taken the session commits to it;
/// there is no later retry of the external source.
const FALLBACK_CITIES: &[(&str, &str)] = &[
    ("San Francisco", "CA"),
    ("New York", "NY"),
    ("Chicago", "IL"),
    ("Seattle", "WA"),
];

/// Snapshot of coordinator state the UI renders from
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardState {
    pub facilities: Vec<Facility>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Events emitted by the coordinator
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoordinatorEvent {
    /// Initialization finished with this many facilities adopted
    Initialized { count: usize },
    /// A facility was created
    FacilityAdded { facility_id: String },
    /// A facility's target temperature changed
    TemperatureUpdated { facility_id: String },
    /// A facility was deleted
    FacilityDeleted { facility_id: String },
    /// A refresh cycle replaced the facility list
    WeatherRefreshed { count: usize },
    /// A preset sweep applied this temperature to all facilities
    PresetsApplied { temperature: f64 },
}

/// Owns the in-memory facility collection and mediates every operation the
/// UI performs against it.
///
/// Concurrency contract: operations are not serialized against each other or
/// against the periodic refresh; whichever async operation resolves last
/// overwrites the in-memory list (last-resolve-wins). The persisted store is
/// the durable source of truth, and a completed refresh cycle re-converges
/// memory with it. Store writes are full-list read-modify-write with no
/// version check, which is only safe for a single-user session.
pub struct FacilityCoordinator {
    service: FacilityService,
    provider: Arc<dyn WeatherProvider>,
    state: RwLock<DashboardState>,
    scheduler: RefreshScheduler,
    event_tx: broadcast::Sender<CoordinatorEvent>,
}

impl FacilityCoordinator {
    pub fn new(service: FacilityService, provider: Arc<dyn WeatherProvider>) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            service,
            provider,
            state: RwLock::new(DashboardState {
                facilities: Vec::new(),
                loading: true,
                error: None,
            }),
            scheduler: RefreshScheduler::new(),
            event_tx,
        }
    }

    /// Subscribe to coordinator events
    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.event_tx.subscribe()
    }

    /// Current state snapshot
    pub async fn state(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    /// Load the persisted facility set, seeding defaults when it is empty.
    ///
    /// Runs once per session. A non-empty persisted list is adopted as-is
    /// with no forced weather refresh; per-city seed failures are logged and
    /// skipped. On an unexpected failure the error flag is set and an empty
    /// list adopted. The loading flag clears regardless of outcome.
    pub async fn initialize(&self) {
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
        }

        let result = self.load_or_seed().await;

        let mut state = self.state.write().await;
        match result {
            Ok(facilities) => {
                tracing::info!("Initialized with {} facilities", facilities.len());
                let _ = self.event_tx.send(CoordinatorEvent::Initialized {
                    count: facilities.len(),
                });
                state.facilities = facilities;
            }
            Err(e) => {
                tracing::error!("Failed to initialize facilities: {}", e);
                state.error = Some(e.to_string());
                state.facilities = Vec::new();
            }
        }
        state.loading = false;
    }

    async fn load_or_seed(&self) -> Result<Vec<Facility>, FacilityError> {
        let existing = self.service.list().await;
        if !existing.is_empty() {
            return Ok(existing);
        }

        // Drop any stale partial record before re-seeding
        self.service.store().clear().await?;

        let seeds = match self.provider.fetch_popular_cities().await {
            Ok(cities) if !cities.is_empty() => cities,
            Ok(_) => fallback_cities(),
            Err(e) => {
                tracing::info!("Popular-cities lookup unavailable, using fallback: {}", e);
                fallback_cities()
            }
        };

        let creates = seeds.iter().map(|city| async move {
            match self
                .service
                .create(&city.name, city.state.as_deref())
                .await
            {
                Ok(facility) => Some(facility),
                Err(e) => {
                    tracing::warn!("Failed to seed {}: {}", city.name, e);
                    None
                }
            }
        });

        Ok(join_all(creates).await.into_iter().flatten().collect())
    }

    /// Start the periodic weather refresh
    pub fn start(self: &Arc<Self>) {
        self.scheduler.start(Arc::clone(self), REFRESH_INTERVAL);
    }

    /// Stop the refresh task (session teardown)
    pub fn shutdown(&self) {
        self.scheduler.stop();
    }

    /// Create a facility and append it to the in-memory list
    pub async fn add_facility(
        &self,
        city: &str,
        state_code: Option<&str>,
    ) -> Result<Facility, FacilityError> {
        self.clear_error().await;
        match self.service.create(city, state_code).await {
            Ok(facility) => {
                self.state.write().await.facilities.push(facility.clone());
                let _ = self.event_tx.send(CoordinatorEvent::FacilityAdded {
                    facility_id: facility.id.clone(),
                });
                Ok(facility)
            }
            Err(e) => {
                self.set_error(&e).await;
                Err(e)
            }
        }
    }

    /// Update a facility's target temperature and replace it in-memory
    pub async fn update_facility_temperature(
        &self,
        id: &str,
        temperature: f64,
    ) -> Result<Facility, FacilityError> {
        self.clear_error().await;
        match self.service.update_temperature(id, temperature).await {
            Ok(updated) => {
                let mut state = self.state.write().await;
                if let Some(slot) = state.facilities.iter_mut().find(|f| f.id == id) {
                    *slot = updated.clone();
                }
                let _ = self.event_tx.send(CoordinatorEvent::TemperatureUpdated {
                    facility_id: id.to_string(),
                });
                Ok(updated)
            }
            Err(e) => {
                self.set_error(&e).await;
                Err(e)
            }
        }
    }

    /// Delete a facility and remove it from the in-memory list
    pub async fn delete_facility(&self, id: &str) -> Result<(), FacilityError> {
        self.clear_error().await;
        match self.service.delete(id).await {
            Ok(()) => {
                self.state.write().await.facilities.retain(|f| f.id != id);
                let _ = self.event_tx.send(CoordinatorEvent::FacilityDeleted {
                    facility_id: id.to_string(),
                });
                Ok(())
            }
            Err(e) => {
                self.set_error(&e).await;
                Err(e)
            }
        }
    }

    /// Refresh weather for all facilities and wholesale-replace the
    /// in-memory list.
    ///
    /// Best-effort: per-facility fetch failures keep the prior snapshot and
    /// never set the user-visible error flag.
    pub async fn refresh_weather_data(&self) {
        let refreshed = self.service.list_with_fresh_weather().await;
        let count = refreshed.len();
        self.state.write().await.facilities = refreshed;
        let _ = self
            .event_tx
            .send(CoordinatorEvent::WeatherRefreshed { count });
        tracing::debug!("Refreshed weather for {} facilities", count);
    }

    /// Set the targeted facility's target temperature (or all facilities',
    /// when no id is given) to the rounded current outdoor temperature, or
    /// the comfort default when no snapshot is available.
    ///
    /// Updates apply independently; one failure does not block the rest. A
    /// full refresh resynchronizes afterwards.
    pub async fn reset_to_local(&self, facility_id: Option<&str>) {
        let targets: Vec<(String, f64)> = {
            let state = self.state.read().await;
            state
                .facilities
                .iter()
                .filter(|f| facility_id.map_or(true, |id| f.id == id))
                .map(|f| {
                    let target = f
                        .weather
                        .as_ref()
                        .map(|w| w.main.temp.round())
                        .unwrap_or(DEFAULT_TARGET_TEMPERATURE);
                    (f.id.clone(), target)
                })
                .collect()
        };

        let updates = targets.into_iter().map(|(id, target)| async move {
            if let Err(e) = self.service.update_temperature(&id, target).await {
                tracing::warn!("Failed to reset facility {} to local: {}", id, e);
            }
        });
        join_all(updates).await;

        self.refresh_weather_data().await;
    }

    /// Apply the active preset bucket to every tracked facility.
    ///
    /// Bucket selection uses the local clock: weekend on Saturday/Sunday,
    /// otherwise day for hours in [8, 20) and night outside it. A bulk sweep
    /// triggered by settings changes, not a per-facility schedule. No-op when
    /// the in-memory list is empty.
    pub async fn apply_temperature_presets(&self, presets: &TemperaturePreset) {
        let ids: Vec<String> = {
            let state = self.state.read().await;
            state.facilities.iter().map(|f| f.id.clone()).collect()
        };
        if ids.is_empty() {
            return;
        }

        let now = Local::now();
        let temperature = select_preset(presets, now.weekday(), now.hour());
        tracing::info!(
            "Applying preset temperature {:.1} to {} facilities",
            temperature,
            ids.len()
        );

        let updates = ids.into_iter().map(|id| async move {
            if let Err(e) = self.service.update_temperature(&id, temperature).await {
                tracing::warn!("Failed to apply preset to facility {}: {}", id, e);
            }
        });
        join_all(updates).await;

        let _ = self
            .event_tx
            .send(CoordinatorEvent::PresetsApplied { temperature });
        self.refresh_weather_data().await;
    }

    async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    async fn set_error(&self, error: &FacilityError) {
        self.state.write().await.error = Some(error.to_string());
    }
}

fn fallback_cities() -> Vec<SeedCity> {
    FALLBACK_CITIES
        .iter()
        .map(|(name, state)| SeedCity {
            name: (*name).to_string(),
            state: Some((*state).to_string()),
        })
        .collect()
}

//! Periodic weather-refresh scheduling

use crate::coordinator::FacilityCoordinator;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Owns the background refresh task for a coordinator's lifetime.
///
/// Started on coordinator startup, stopped on teardown; dropping the
/// scheduler aborts the task.
pub struct RefreshScheduler {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            handle: Mutex::new(None),
        }
    }

    /// Spawn the interval task. The first immediate tick is skipped.
    pub fn start(&self, coordinator: Arc<FacilityCoordinator>, period: Duration) {
        self.stop();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;
                tracing::debug!("Periodic weather refresh fired");
                coordinator.refresh_weather_data().await;
            }
        });

        *self.handle.lock().unwrap() = Some(handle);
        tracing::info!("Scheduled weather refresh every {:?}", period);
    }

    /// Abort the refresh task if one is running
    pub fn stop(&self) {
        if let Some(handle) = self.handle.lock().unwrap().take() {
            handle.abort();
            tracing::debug!("Stopped weather refresh task");
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.lock().unwrap().is_some()
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.lock().unwrap().take() {
            handle.abort();
        }
    }
}

//! Facility Temperature Dashboard - API server

use axum::{
    extract::{Path, State, WebSocketUpgrade},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use facility_core::{FacilityError, FacilityService, FacilityStore};
use facility_engine::{
    EnergySavingBands, FacilityCoordinator, SeasonalProfiles, SettingsStore, TemperaturePreset,
    TemperatureThresholds,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weather_gateway::{GatewayConfig, GatewayError, WeatherGateway, WeatherProvider};

mod config;
mod websocket;

use config::ApiConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<FacilityCoordinator>,
    pub settings: Arc<SettingsStore>,
}

/// API response wrapper
#[derive(Serialize)]
struct ApiResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ApiResponse {
    fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: Some(serde_json::to_value(data).unwrap_or(serde_json::Value::Null)),
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// Map a facility error to the HTTP status the UI expects
fn error_status(error: &FacilityError) -> StatusCode {
    match error {
        FacilityError::NotFound(_) => StatusCode::NOT_FOUND,
        FacilityError::DuplicateFacility { .. } => StatusCode::CONFLICT,
        FacilityError::Weather(GatewayError::CityNotFound(_)) => StatusCode::NOT_FOUND,
        FacilityError::Weather(GatewayError::MissingApiKey) => StatusCode::INTERNAL_SERVER_ERROR,
        FacilityError::Weather(_) => StatusCode::BAD_GATEWAY,
        FacilityError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Deserialize)]
struct CreateFacilityRequest {
    city: String,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Deserialize)]
struct UpdateTemperatureRequest {
    temperature: f64,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ResetToLocalRequest {
    #[serde(default)]
    facility_id: Option<String>,
}

/// Dashboard state snapshot: facilities plus loading/error flags
async fn get_facilities(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(state.coordinator.state().await))
}

/// Add a facility by city name
async fn add_facility(
    State(state): State<AppState>,
    Json(req): Json<CreateFacilityRequest>,
) -> impl IntoResponse {
    match state
        .coordinator
        .add_facility(&req.city, req.state.as_deref())
        .await
    {
        Ok(facility) => (StatusCode::CREATED, Json(ApiResponse::success(facility))),
        Err(e) => (error_status(&e), Json(ApiResponse::error(e.to_string()))),
    }
}

/// Set a facility's target temperature
async fn update_temperature(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTemperatureRequest>,
) -> impl IntoResponse {
    match state
        .coordinator
        .update_facility_temperature(&id, req.temperature)
        .await
    {
        Ok(facility) => (StatusCode::OK, Json(ApiResponse::success(facility))),
        Err(e) => (error_status(&e), Json(ApiResponse::error(e.to_string()))),
    }
}

/// Delete a facility (idempotent)
async fn delete_facility(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.coordinator.delete_facility(&id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({ "deleted": id }))),
        ),
        Err(e) => (error_status(&e), Json(ApiResponse::error(e.to_string()))),
    }
}

/// On-demand weather refresh for all facilities
async fn refresh_weather(State(state): State<AppState>) -> impl IntoResponse {
    state.coordinator.refresh_weather_data().await;
    Json(ApiResponse::success(state.coordinator.state().await))
}

/// Reset targets to the current outdoor temperature, for one facility or all
async fn reset_to_local(
    State(state): State<AppState>,
    body: Option<Json<ResetToLocalRequest>>,
) -> impl IntoResponse {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    state
        .coordinator
        .reset_to_local(req.facility_id.as_deref())
        .await;
    Json(ApiResponse::success(state.coordinator.state().await))
}

async fn get_presets(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(
        state.settings.temperature_presets().await,
    ))
}

/// Update presets and sweep them across all facilities
async fn set_presets(
    State(state): State<AppState>,
    Json(presets): Json<TemperaturePreset>,
) -> impl IntoResponse {
    if let Err(e) = state.settings.set_temperature_presets(presets.clone()).await {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(e.to_string())),
        );
    }

    // Settings change drives the bulk policy sweep
    state.coordinator.apply_temperature_presets(&presets).await;
    (StatusCode::OK, Json(ApiResponse::success(presets)))
}

async fn get_thresholds(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(
        state.settings.temperature_thresholds().await,
    ))
}

async fn set_thresholds(
    State(state): State<AppState>,
    Json(thresholds): Json<TemperatureThresholds>,
) -> impl IntoResponse {
    match state
        .settings
        .set_temperature_thresholds(thresholds.clone())
        .await
    {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::success(thresholds))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(e.to_string())),
        ),
    }
}

async fn get_seasonal_profiles(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(
        state.settings.seasonal_profiles().await,
    ))
}

async fn set_seasonal_profiles(
    State(state): State<AppState>,
    Json(profiles): Json<SeasonalProfiles>,
) -> impl IntoResponse {
    match state
        .settings
        .set_seasonal_profiles(profiles.clone())
        .await
    {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::success(profiles))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(e.to_string())),
        ),
    }
}

async fn get_energy_bands(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(
        state.settings.energy_saving_bands().await,
    ))
}

async fn set_energy_bands(
    State(state): State<AppState>,
    Json(bands): Json<EnergySavingBands>,
) -> impl IntoResponse {
    match state.settings.set_energy_saving_bands(bands.clone()).await {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::success(bands))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(e.to_string())),
        ),
    }
}

/// WebSocket upgrade handler
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| websocket::handle_socket(socket, state))
}

/// Health check
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "facility_dashboard_api=debug,facility_engine=debug,info".into()),
        )
        .init();

    tracing::info!("Starting Facility Dashboard API server");

    let config = ApiConfig::from_env()?;

    let mut gateway_config = GatewayConfig::new(config.api_key.clone());
    gateway_config.popular_cities_url = config.popular_cities_url.clone();
    let gateway: Arc<dyn WeatherProvider> = Arc::new(WeatherGateway::new(gateway_config));

    let store = FacilityStore::new(&config.data_dir);
    let service = FacilityService::new(store, gateway.clone());
    let settings = Arc::new(SettingsStore::load(&config.data_dir).await);

    let coordinator = Arc::new(FacilityCoordinator::new(service, gateway));
    coordinator.initialize().await;
    coordinator.start();

    let state = AppState {
        coordinator: coordinator.clone(),
        settings,
    };

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/v1/facilities", get(get_facilities).post(add_facility))
        .route("/api/v1/facilities/refresh", post(refresh_weather))
        .route("/api/v1/facilities/reset-to-local", post(reset_to_local))
        .route("/api/v1/facilities/:id/temperature", put(update_temperature))
        .route("/api/v1/facilities/:id", delete(delete_facility))
        .route("/api/v1/settings/presets", get(get_presets).put(set_presets))
        .route(
            "/api/v1/settings/thresholds",
            get(get_thresholds).put(set_thresholds),
        )
        .route(
            "/api/v1/settings/seasonal-profiles",
            get(get_seasonal_profiles).put(set_seasonal_profiles),
        )
        .route(
            "/api/v1/settings/energy-bands",
            get(get_energy_bands).put(set_energy_bands),
        )
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    tracing::info!("Listening on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    coordinator.shutdown();
    Ok(())
}

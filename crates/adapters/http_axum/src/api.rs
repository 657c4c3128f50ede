//! JSON API handlers.
//!
//! - `GET  /api/snapshot`               current dashboard snapshot
//! - `GET  /api/thermostats`            thermostat dropdown options
//! - `GET  /api/control/thermal`        control loop status
//! - `POST /api/control/thermal`        ingest wearable samples and decide
//! - `POST /api/control/thermal/cancel` roll back the last decision
//! - `POST /api/config/room/temp`       set the preferred room temperature
//!
//! The control endpoints act on the thermostat selected in the dashboard.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use biothermal_app::ports::{ComfortClassifier, HomeAssistant};
use biothermal_app::services::dashboard_service::DashboardSnapshot;
use biothermal_app::services::thermal_control::ControlStatus;
use biothermal_domain::control::DecisionRecord;
use biothermal_domain::thermostat::Thermostat;
use biothermal_domain::wearable::WearableSample;

use crate::error::ApiError;
use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<H, C>() -> Router<AppState<H, C>>
where
    H: HomeAssistant + 'static,
    C: ComfortClassifier + 'static,
{
    Router::new()
        .route("/snapshot", get(snapshot::<H, C>))
        .route("/thermostats", get(thermostats::<H, C>))
        .route(
            "/control/thermal",
            get(control_status::<H, C>).post(ingest::<H, C>),
        )
        .route("/control/thermal/cancel", post(cancel::<H, C>))
        .route("/config/room/temp", post(set_room_temperature::<H, C>))
}

/// Request body of `POST /api/control/thermal`.
#[derive(Debug, Deserialize)]
pub struct ThermalRequest {
    pub sensor_data: Vec<WearableSample>,
    #[serde(default)]
    pub user_feedback: Option<i64>,
}

/// Request body of `POST /api/config/room/temp`.
#[derive(Debug, Deserialize)]
pub struct RoomTemperatureRequest {
    pub room_temp: f64,
}

/// `GET /api/snapshot`
pub async fn snapshot<H, C>(State(state): State<AppState<H, C>>) -> Json<DashboardSnapshot>
where
    H: HomeAssistant + 'static,
    C: ComfortClassifier + 'static,
{
    Json(state.dashboard.snapshot().await)
}

/// `GET /api/thermostats`
pub async fn thermostats<H, C>(State(state): State<AppState<H, C>>) -> Json<Vec<Thermostat>>
where
    H: HomeAssistant + 'static,
    C: ComfortClassifier + 'static,
{
    Json(state.dashboard.thermostats().await)
}

/// `GET /api/control/thermal`
pub async fn control_status<H, C>(State(state): State<AppState<H, C>>) -> Json<ControlStatus>
where
    H: HomeAssistant + 'static,
    C: ComfortClassifier + 'static,
{
    Json(state.control.status().await)
}

/// `POST /api/control/thermal`
///
/// # Errors
///
/// 400 for an empty batch, out-of-range feedback or no selected thermostat,
/// 502 when HomeAssistant fails, 503 when the classifier fails.
pub async fn ingest<H, C>(
    State(state): State<AppState<H, C>>,
    Json(req): Json<ThermalRequest>,
) -> Result<Json<DecisionRecord>, ApiError>
where
    H: HomeAssistant + 'static,
    C: ComfortClassifier + 'static,
{
    let selection = state.dashboard.selection().await;
    let decision = state
        .control
        .ingest(&req.sensor_data, req.user_feedback, selection.entity_id())
        .await?;
    Ok(Json(decision))
}

/// `POST /api/control/thermal/cancel`
///
/// # Errors
///
/// 404 when there is no earlier decision to return to.
pub async fn cancel<H, C>(
    State(state): State<AppState<H, C>>,
) -> Result<Json<DecisionRecord>, ApiError>
where
    H: HomeAssistant + 'static,
    C: ComfortClassifier + 'static,
{
    let selection = state.dashboard.selection().await;
    let decision = state.control.rollback(selection.entity_id()).await?;
    Ok(Json(decision))
}

/// `POST /api/config/room/temp`
///
/// # Errors
///
/// 400 for non-finite or implausible temperatures.
pub async fn set_room_temperature<H, C>(
    State(state): State<AppState<H, C>>,
    Json(req): Json<RoomTemperatureRequest>,
) -> Result<Json<ControlStatus>, ApiError>
where
    H: HomeAssistant + 'static,
    C: ComfortClassifier + 'static,
{
    let status = state.control.set_room_temperature(req.room_temp).await?;
    Ok(Json(status))
}

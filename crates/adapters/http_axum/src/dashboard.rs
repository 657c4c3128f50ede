//! Server-side rendered HTML dashboard (no JavaScript).
//!
//! - `GET  /`           renders the latest [`DashboardSnapshot`]
//! - `POST /thermostat` handles the dropdown form (PRG)
//!
//! The page reloads itself with `<meta http-equiv="refresh">`; handlers
//! never call HomeAssistant, they only read what the poller stored.

use askama::Template;
use axum::Router;
use axum::extract::{Form, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use serde::Deserialize;

use biothermal_app::ports::{ComfortClassifier, HomeAssistant};
use biothermal_app::services::dashboard_service::{DashboardSnapshot, DecisionStatus, Freshness};
use biothermal_domain::comfort::ClassifierDecision;
use biothermal_domain::entity_id::EntityId;
use biothermal_domain::time::Timestamp;

use crate::error::ApiError;
use crate::state::AppState;

/// Build the dashboard sub-router.
pub fn routes<H, C>() -> Router<AppState<H, C>>
where
    H: HomeAssistant + 'static,
    C: ComfortClassifier + 'static,
{
    Router::new()
        .route("/", get(index::<H, C>))
        .route("/thermostat", post(select_thermostat::<H, C>))
}

pub struct StaleView {
    reason: String,
    since: String,
}

pub struct RoomView {
    temperature: String,
    humidity: String,
    hvac_mode: String,
}

pub struct DecisionView {
    label: String,
    css: &'static str,
    zone: &'static str,
    model: String,
}

pub struct ThermostatOption {
    value: String,
    label: String,
    selected: bool,
}

/// Dashboard page template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    refresh_seconds: u64,
    pending: bool,
    stale: Option<StaleView>,
    updated_at: Option<String>,
    wrist: Option<String>,
    heart_rate: Option<String>,
    room: Option<RoomView>,
    decision: Option<DecisionView>,
    decision_unavailable: Option<String>,
    thermostats: Vec<ThermostatOption>,
    nothing_selected: bool,
}

impl IntoResponse for DashboardTemplate {
    fn into_response(self) -> Response {
        Html(self.to_string()).into_response()
    }
}

fn clock(at: Timestamp) -> String {
    at.format("%H:%M:%S UTC").to_string()
}

impl DashboardTemplate {
    fn new(snapshot: &DashboardSnapshot, refresh_seconds: u64) -> Self {
        let (pending, stale, updated_at) = match &snapshot.freshness {
            Freshness::Pending => (true, None, None),
            Freshness::Fresh { at } => (false, None, Some(clock(*at))),
            Freshness::Stale { reason, since } => (
                false,
                Some(StaleView {
                    reason: reason.clone(),
                    since: clock(*since),
                }),
                None,
            ),
        };

        let (decision, decision_unavailable) = match &snapshot.decision {
            DecisionStatus::Pending => (None, None),
            DecisionStatus::Available {
                zone,
                decision,
                model,
            } => {
                let css = match decision {
                    ClassifierDecision::Heat => "heat",
                    ClassifierDecision::Cool => "cool",
                    ClassifierDecision::Idle => "idle",
                };
                let view = DecisionView {
                    label: decision.to_string(),
                    css,
                    zone: zone.label(),
                    model: model.clone(),
                };
                (Some(view), None)
            }
            DecisionStatus::Unavailable { reason } => (None, Some(reason.clone())),
        };

        let room = snapshot.room.as_ref().map(|room| RoomView {
            temperature: format!("{:.1} °C", room.temperature),
            humidity: room
                .humidity
                .map_or_else(|| "humidity n/a".to_string(), |h| format!("{h:.0} %")),
            hvac_mode: room.hvac_mode.to_string(),
        });

        let thermostats = snapshot
            .thermostats
            .iter()
            .map(|t| ThermostatOption {
                value: t.entity_id.to_string(),
                label: t.friendly_name.clone(),
                selected: snapshot.selection.is_selected(&t.entity_id),
            })
            .collect();

        Self {
            refresh_seconds,
            pending,
            stale,
            updated_at,
            wrist: snapshot.wrist.as_ref().map(|r| r.display_value()),
            heart_rate: snapshot.heart_rate.as_ref().map(|r| r.display_value()),
            room,
            decision,
            decision_unavailable,
            thermostats,
            nothing_selected: snapshot.selection.entity_id().is_none(),
        }
    }
}

/// `GET /`: the dashboard.
pub async fn index<H, C>(State(state): State<AppState<H, C>>) -> DashboardTemplate
where
    H: HomeAssistant + 'static,
    C: ComfortClassifier + 'static,
{
    let snapshot = state.dashboard.snapshot().await;
    DashboardTemplate::new(&snapshot, state.refresh_seconds)
}

/// Form data of the thermostat dropdown. An empty value clears the selection.
#[derive(Deserialize)]
pub struct ThermostatForm {
    #[serde(default)]
    pub thermostat: String,
}

/// `POST /thermostat`: change the selection, then redirect back (PRG).
///
/// # Errors
///
/// Returns a 400 response for malformed ids and ids HomeAssistant did not
/// report as thermostats.
pub async fn select_thermostat<H, C>(
    State(state): State<AppState<H, C>>,
    Form(form): Form<ThermostatForm>,
) -> Result<Redirect, ApiError>
where
    H: HomeAssistant + 'static,
    C: ComfortClassifier + 'static,
{
    let raw = form.thermostat.trim();
    let entity_id = if raw.is_empty() {
        None
    } else {
        Some(EntityId::parse(raw)?)
    };
    state.dashboard.select_thermostat(entity_id).await?;
    Ok(Redirect::to("/"))
}

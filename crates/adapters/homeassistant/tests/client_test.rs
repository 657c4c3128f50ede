//! Tests the REST client against an in-process fake HomeAssistant.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use biothermal_adapter_homeassistant::{HomeAssistantClient, HomeAssistantConfig};
use biothermal_app::ports::HomeAssistant;
use biothermal_domain::climate::HvacMode;
use biothermal_domain::entity_id::EntityId;
use biothermal_domain::error::{BioThermalError, FetchError};

const TOKEN: &str = "test-token-0123456789";

#[derive(Clone, Default)]
struct FakeHa {
    service_calls: Arc<Mutex<Vec<(String, Value)>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(format!("Bearer {TOKEN}").as_str())
}

fn states() -> Vec<Value> {
    vec![
        json!({
            "entity_id": "sensor.wrist_temperature",
            "state": "33.6",
            "attributes": {"unit_of_measurement": "°C", "friendly_name": "Wrist temperature"},
            "last_updated": "2024-03-01T10:00:05+00:00"
        }),
        json!({
            "entity_id": "sensor.heart_rate",
            "state": "unavailable",
            "attributes": {}
        }),
        json!({
            "entity_id": "climate.office",
            "state": "cool",
            "attributes": {"current_temperature": 24.5, "current_humidity": 55, "temperature": 23, "friendly_name": "Office"}
        }),
        json!({
            "entity_id": "sensor.outdoor_template",
            "state": "ok",
            "attributes": {"temperature": "n/a", "current_humidity": "unknown"}
        }),
        json!({
            "entity_id": "climate.bedroom",
            "state": "off",
            "attributes": {"current_temperature": 19.0, "friendly_name": "Bedroom"}
        }),
    ]
}

async fn api_root(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({"message": "API running."})).into_response()
}

async fn all_states(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(states()).into_response()
}

async fn one_state(headers: HeaderMap, Path(entity_id): Path<String>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match states().into_iter().find(|s| s["entity_id"] == entity_id.as_str()) {
        Some(state) => Json(state).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "Entity not found."}))).into_response(),
    }
}

async fn call_service(
    State(fake): State<FakeHa>,
    headers: HeaderMap,
    Path((domain, service)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    fake.service_calls
        .lock()
        .unwrap()
        .push((format!("{domain}.{service}"), body));
    Json(json!([])).into_response()
}

async fn spawn_fake(fake: FakeHa) -> SocketAddr {
    let app = Router::new()
        .route("/api/", get(api_root))
        .route("/api/states", get(all_states))
        .route("/api/states/{entity_id}", get(one_state))
        .route("/api/services/{domain}/{service}", post(call_service))
        .with_state(fake);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr, token: &str) -> HomeAssistantClient {
    HomeAssistantClient::new(&HomeAssistantConfig {
        host: format!("http://{addr}"),
        token: token.to_string(),
        timeout: Duration::from_secs(2),
    })
    .unwrap()
}

fn id(raw: &str) -> EntityId {
    EntityId::parse(raw).unwrap()
}

#[tokio::test]
async fn should_check_api_with_valid_token() {
    let addr = spawn_fake(FakeHa::default()).await;
    client(addr, TOKEN).check_api().await.unwrap();
}

#[tokio::test]
async fn should_map_rejected_token_to_unauthorized() {
    let addr = spawn_fake(FakeHa::default()).await;
    let result = client(addr, "wrong-token-0000").check_api().await;
    assert!(matches!(
        result,
        Err(BioThermalError::Fetch(FetchError::Unauthorized(401)))
    ));
}

#[tokio::test]
async fn should_fetch_latest_reading() {
    let addr = spawn_fake(FakeHa::default()).await;
    let reading = client(addr, TOKEN)
        .fetch_reading(&id("sensor.wrist_temperature"))
        .await
        .unwrap();
    assert!((reading.value - 33.6).abs() < f64::EPSILON);
    assert_eq!(reading.display_value(), "33.6 °C");
}

#[tokio::test]
async fn should_map_unknown_entity_to_not_found() {
    let addr = spawn_fake(FakeHa::default()).await;
    let result = client(addr, TOKEN).fetch_reading(&id("sensor.nope")).await;
    assert!(matches!(result, Err(BioThermalError::NotFound(_))));
}

#[tokio::test]
async fn should_map_unavailable_state_to_invalid_state() {
    let addr = spawn_fake(FakeHa::default()).await;
    let result = client(addr, TOKEN).fetch_reading(&id("sensor.heart_rate")).await;
    assert!(matches!(
        result,
        Err(BioThermalError::Fetch(FetchError::InvalidState { .. }))
    ));
}

#[tokio::test]
async fn should_map_refused_connection_to_network_error() {
    let client = HomeAssistantClient::new(&HomeAssistantConfig {
        host: "http://127.0.0.1:1".to_string(),
        token: TOKEN.to_string(),
        timeout: Duration::from_secs(2),
    })
    .unwrap();
    let result = client.fetch_reading(&id("sensor.wrist_temperature")).await;
    assert!(matches!(
        result,
        Err(BioThermalError::Fetch(FetchError::Network(_)))
    ));
}

#[tokio::test]
async fn should_fetch_room_climate() {
    let addr = spawn_fake(FakeHa::default()).await;
    let climate = client(addr, TOKEN)
        .fetch_climate(&id("climate.office"))
        .await
        .unwrap();
    assert!((climate.temperature - 24.5).abs() < f64::EPSILON);
    assert_eq!(climate.humidity, Some(55.0));
    assert_eq!(climate.hvac_mode, HvacMode::Cool);
}

#[tokio::test]
async fn should_list_thermostats_sorted_by_name() {
    let addr = spawn_fake(FakeHa::default()).await;
    let thermostats = client(addr, TOKEN).list_thermostats().await.unwrap();
    let names: Vec<&str> = thermostats.iter().map(|t| t.friendly_name.as_str()).collect();
    assert_eq!(names, ["Bedroom", "Office"]);
}

#[tokio::test]
async fn should_call_climate_services() {
    let fake = FakeHa::default();
    let addr = spawn_fake(fake.clone()).await;
    let client = client(addr, TOKEN);

    client
        .set_hvac_mode(&id("climate.office"), HvacMode::Heat)
        .await
        .unwrap();
    client
        .set_temperature(&id("climate.office"), 22.5)
        .await
        .unwrap();

    let calls = fake.service_calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0, "climate.set_hvac_mode");
    assert_eq!(calls[0].1, json!({"entity_id": "climate.office", "hvac_mode": "heat"}));
    assert_eq!(calls[1].0, "climate.set_temperature");
    assert_eq!(calls[1].1["temperature"], json!(22.5));
}

//! REST client implementing the [`HomeAssistant`] port.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use serde_json::json;

use biothermal_app::ports::HomeAssistant;
use biothermal_domain::climate::{HvacMode, RoomClimate};
use biothermal_domain::entity_id::EntityId;
use biothermal_domain::error::BioThermalError;
use biothermal_domain::reading::Reading;
use biothermal_domain::thermostat::Thermostat;

use crate::error::HomeAssistantError;
use crate::state::EntityState;

/// Connection settings for a HomeAssistant instance.
#[derive(Clone)]
pub struct HomeAssistantConfig {
    /// Base URL, e.g. `http://homeassistant.local:8123`. A trailing `/api` is accepted.
    pub host: String,
    /// Long-lived access token.
    pub token: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for HomeAssistantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomeAssistantConfig")
            .field("host", &self.host)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// HomeAssistant REST API client.
///
/// Cheap to clone: the underlying connection pool is shared.
#[derive(Clone)]
pub struct HomeAssistantClient {
    client: Client,
    api_url: String,
    token: String,
}

impl std::fmt::Debug for HomeAssistantClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomeAssistantClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl HomeAssistantClient {
    /// Build a client for the given instance.
    ///
    /// # Errors
    ///
    /// Returns [`HomeAssistantError::Request`] if the HTTP client cannot be
    /// constructed (e.g. the TLS backend fails to initialise).
    pub fn new(config: &HomeAssistantConfig) -> Result<Self, HomeAssistantError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(HomeAssistantError::Request)?;
        let host = config.host.trim_end_matches('/');
        let host = host.strip_suffix("/api").unwrap_or(host);
        Ok(Self {
            client,
            api_url: format!("{host}/api"),
            token: config.token.clone(),
        })
    }

    /// The API root all requests are made against.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(header::AUTHORIZATION, format!("Bearer {}", self.token))
    }

    async fn send(
        &self,
        request: RequestBuilder,
        subject: &str,
    ) -> Result<Response, HomeAssistantError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(HomeAssistantError::Request)?;
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(HomeAssistantError::Unauthorized(response.status().as_u16()))
            }
            StatusCode::NOT_FOUND => Err(HomeAssistantError::NotFound(subject.to_string())),
            status => Err(HomeAssistantError::Status(status.as_u16())),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        subject: &str,
    ) -> Result<T, HomeAssistantError> {
        let url = format!("{}{path}", self.api_url);
        tracing::debug!(%url, "GET");
        let response = self.send(self.client.get(&url), subject).await?;
        let body = response.bytes().await.map_err(HomeAssistantError::Request)?;
        serde_json::from_slice(&body).map_err(HomeAssistantError::Decode)
    }

    async fn call_service(
        &self,
        domain: &str,
        service: &str,
        data: serde_json::Value,
    ) -> Result<(), HomeAssistantError> {
        let url = format!("{}/services/{domain}/{service}", self.api_url);
        tracing::debug!(%url, %data, "POST");
        self.send(self.client.post(&url).json(&data), &format!("{domain}.{service}"))
            .await?;
        Ok(())
    }

    async fn state(&self, entity_id: &EntityId) -> Result<EntityState, HomeAssistantError> {
        self.get_json(&format!("/states/{entity_id}"), entity_id.as_str())
            .await
    }
}

impl HomeAssistant for HomeAssistantClient {
    async fn check_api(&self) -> Result<(), BioThermalError> {
        let body: serde_json::Value = self.get_json("/", "api").await?;
        let message = body
            .get("message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        tracing::info!(api_url = %self.api_url, reply = message, "HomeAssistant API reachable");
        Ok(())
    }

    async fn fetch_reading(&self, entity_id: &EntityId) -> Result<Reading, BioThermalError> {
        Ok(self.state(entity_id).await?.into_reading()?)
    }

    async fn fetch_climate(&self, entity_id: &EntityId) -> Result<RoomClimate, BioThermalError> {
        Ok(self.state(entity_id).await?.into_climate()?)
    }

    async fn list_thermostats(&self) -> Result<Vec<Thermostat>, BioThermalError> {
        let states: Vec<EntityState> = self.get_json("/states", "states").await?;
        let mut thermostats: Vec<Thermostat> = states
            .into_iter()
            .filter_map(EntityState::into_thermostat)
            .collect();
        thermostats.sort_by(|a, b| {
            a.friendly_name
                .cmp(&b.friendly_name)
                .then_with(|| a.entity_id.as_str().cmp(b.entity_id.as_str()))
        });
        Ok(thermostats)
    }

    async fn set_hvac_mode(&self, entity_id: &EntityId, mode: HvacMode) -> Result<(), BioThermalError> {
        let data = json!({ "entity_id": entity_id, "hvac_mode": mode });
        Ok(self.call_service("climate", "set_hvac_mode", data).await?)
    }

    async fn set_temperature(
        &self,
        entity_id: &EntityId,
        temperature: f64,
    ) -> Result<(), BioThermalError> {
        let data = json!({ "entity_id": entity_id, "temperature": temperature });
        Ok(self.call_service("climate", "set_temperature", data).await?)
    }
}

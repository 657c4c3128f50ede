//! In-memory ports backing the router tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use biothermal_app::ports::{ComfortClassifier, HomeAssistant};
use biothermal_app::services::dashboard_service::{DashboardService, SensorSettings};
use biothermal_app::services::thermal_control::{ControlSettings, ThermalControlService};
use biothermal_domain::climate::{HvacMode, RoomClimate};
use biothermal_domain::comfort::ComfortZone;
use biothermal_domain::entity_id::EntityId;
use biothermal_domain::error::{BioThermalError, FetchError, NotFoundError};
use biothermal_domain::features::{Feature, FeatureVector};
use biothermal_domain::reading::Reading;
use biothermal_domain::thermostat::{Thermostat, ThermostatSelection};
use biothermal_domain::time::now;

use crate::state::AppState;

pub(crate) const WRIST: &str = "sensor.wrist_temperature";

/// Clones share their state, so a test can flip a stub the services own.
#[derive(Clone)]
pub(crate) struct StubHomeAssistant {
    wrist: f64,
    offline: Arc<AtomicBool>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StubHomeAssistant {
    pub fn new(wrist: f64) -> Self {
        Self {
            wrist,
            offline: Arc::default(),
            calls: Arc::default(),
        }
    }

    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn online(&self) -> Result<(), BioThermalError> {
        if self.offline.load(Ordering::SeqCst) {
            let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
            return Err(FetchError::Network(Box::new(refused)).into());
        }
        Ok(())
    }

    fn thermostat(entity_id: &EntityId) -> Result<(&'static str, f64), BioThermalError> {
        match entity_id.as_str() {
            "climate.office" => Ok(("Office", 22.0)),
            "climate.bedroom" => Ok(("Bedroom <2F>", 19.5)),
            _ => Err(NotFoundError {
                entity: "Entity",
                id: entity_id.to_string(),
            }
            .into()),
        }
    }
}

impl HomeAssistant for StubHomeAssistant {
    async fn check_api(&self) -> Result<(), BioThermalError> {
        self.online()
    }

    async fn fetch_reading(&self, entity_id: &EntityId) -> Result<Reading, BioThermalError> {
        self.online()?;
        if entity_id.as_str() != WRIST {
            return Err(NotFoundError {
                entity: "Entity",
                id: entity_id.to_string(),
            }
            .into());
        }
        Ok(Reading::builder(entity_id.clone())
            .value(self.wrist)
            .unit("°C")
            .build())
    }

    async fn fetch_climate(&self, entity_id: &EntityId) -> Result<RoomClimate, BioThermalError> {
        self.online()?;
        let (_, temperature) = Self::thermostat(entity_id)?;
        Ok(RoomClimate {
            thermostat: entity_id.clone(),
            temperature,
            humidity: Some(45.0),
            hvac_mode: HvacMode::Off,
            target_temperature: None,
            recorded_at: now(),
        })
    }

    async fn list_thermostats(&self) -> Result<Vec<Thermostat>, BioThermalError> {
        self.online()?;
        ["climate.bedroom", "climate.office"]
            .into_iter()
            .map(|raw| -> Result<Thermostat, BioThermalError> {
                let entity_id = EntityId::parse(raw)?;
                let (name, _) = Self::thermostat(&entity_id)?;
                Ok(Thermostat {
                    entity_id,
                    friendly_name: name.to_string(),
                })
            })
            .collect()
    }

    async fn set_hvac_mode(&self, entity_id: &EntityId, mode: HvacMode) -> Result<(), BioThermalError> {
        self.online()?;
        self.calls
            .lock()
            .unwrap()
            .push(format!("set_hvac_mode {entity_id} {mode}"));
        Ok(())
    }

    async fn set_temperature(&self, entity_id: &EntityId, temperature: f64) -> Result<(), BioThermalError> {
        self.online()?;
        self.calls
            .lock()
            .unwrap()
            .push(format!("set_temperature {entity_id} {temperature:.2}"));
        Ok(())
    }
}

/// Maps wrist temperature to a zone with fixed cut points.
pub(crate) struct ThresholdClassifier;

impl ComfortClassifier for ThresholdClassifier {
    fn name(&self) -> &str {
        "threshold"
    }

    fn predict(&self, features: &FeatureVector) -> Result<ComfortZone, BioThermalError> {
        let wrist = features.get(Feature::WristTempInCelsius).unwrap_or(33.5);
        Ok(match wrist {
            t if t < 31.0 => ComfortZone::Cold,
            t if t < 32.5 => ComfortZone::Cool,
            t if t <= 34.5 => ComfortZone::Neutral,
            t if t <= 36.0 => ComfortZone::Warm,
            _ => ComfortZone::Hot,
        })
    }
}

pub(crate) fn test_state_with(
    home_assistant: StubHomeAssistant,
) -> AppState<StubHomeAssistant, ThresholdClassifier> {
    let sensors = SensorSettings {
        wrist_temperature: EntityId::parse(WRIST).unwrap(),
        heart_rate: None,
    };
    let dashboard = DashboardService::new(
        home_assistant.clone(),
        ThresholdClassifier,
        sensors,
        ThermostatSelection::none(),
    );
    let control = ThermalControlService::new(
        home_assistant,
        ThresholdClassifier,
        ControlSettings {
            enabled: true,
            history_hours: 8,
        },
    );
    AppState::new(Arc::new(dashboard), Arc::new(control), 5)
}

pub(crate) fn test_state() -> AppState<StubHomeAssistant, ThresholdClassifier> {
    test_state_with(StubHomeAssistant::new(33.5))
}

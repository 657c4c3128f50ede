//! In-memory port implementations shared by the service tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use biothermal_domain::climate::{HvacMode, RoomClimate};
use biothermal_domain::comfort::ComfortZone;
use biothermal_domain::entity_id::EntityId;
use biothermal_domain::error::{BioThermalError, FetchError, ModelError, NotFoundError};
use biothermal_domain::features::{Feature, FeatureVector};
use biothermal_domain::reading::Reading;
use biothermal_domain::thermostat::Thermostat;

use crate::ports::{ComfortClassifier, HomeAssistant};

#[derive(Default)]
pub(crate) struct StubHomeAssistant {
    readings: HashMap<String, f64>,
    climates: HashMap<String, (String, f64, Option<f64>)>,
    offline: AtomicBool,
    actuators_broken: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl StubHomeAssistant {
    pub fn with_reading(mut self, entity_id: &str, value: f64) -> Self {
        self.readings.insert(entity_id.to_string(), value);
        self
    }

    pub fn with_thermostat(
        mut self,
        entity_id: &str,
        name: &str,
        temperature: f64,
        humidity: Option<f64>,
    ) -> Self {
        self.climates
            .insert(entity_id.to_string(), (name.to_string(), temperature, humidity));
        self
    }

    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    /// Make HVAC service calls fail while reads keep working.
    pub fn break_actuators(&self) {
        self.actuators_broken.store(true, Ordering::SeqCst);
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

    fn actuators_working(&self) -> Result<(), BioThermalError> {
        self.online()?;
        if self.actuators_broken.load(Ordering::SeqCst) {
            return Err(FetchError::Status(500).into());
        }
        Ok(())
    }

    fn not_found(entity_id: &EntityId) -> BioThermalError {
        NotFoundError {
            entity: "Entity",
            id: entity_id.to_string(),
        }
        .into()
    }
}

impl HomeAssistant for StubHomeAssistant {
    async fn check_api(&self) -> Result<(), BioThermalError> {
        self.online()
    }

    async fn fetch_reading(&self, entity_id: &EntityId) -> Result<Reading, BioThermalError> {
        self.online()?;
        let value = self
            .readings
            .get(entity_id.as_str())
            .ok_or_else(|| Self::not_found(entity_id))?;
        Ok(Reading::builder(entity_id.clone())
            .value(*value)
            .unit("\u{b0}C")
            .build())
    }

    async fn fetch_climate(&self, entity_id: &EntityId) -> Result<RoomClimate, BioThermalError> {
        self.online()?;
        let (_, temperature, humidity) = self
            .climates
            .get(entity_id.as_str())
            .ok_or_else(|| Self::not_found(entity_id))?;
        Ok(RoomClimate {
            thermostat: entity_id.clone(),
            temperature: *temperature,
            humidity: *humidity,
            hvac_mode: HvacMode::Off,
            target_temperature: None,
            recorded_at: biothermal_domain::time::now(),
        })
    }

    async fn list_thermostats(&self) -> Result<Vec<Thermostat>, BioThermalError> {
        self.online()?;
        let mut thermostats = self
            .climates
            .iter()
            .map(|(id, (name, _, _))| -> Result<Thermostat, BioThermalError> {
                Ok(Thermostat {
                    entity_id: EntityId::parse(id.as_str())?,
                    friendly_name: name.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        thermostats.sort_by(|a, b| a.friendly_name.cmp(&b.friendly_name));
        Ok(thermostats)
    }

    async fn set_hvac_mode(&self, entity_id: &EntityId, mode: HvacMode) -> Result<(), BioThermalError> {
        self.actuators_working()?;
        self.calls
            .lock()
            .unwrap()
            .push(format!("set_hvac_mode {entity_id} {mode}"));
        Ok(())
    }

    async fn set_temperature(&self, entity_id: &EntityId, temperature: f64) -> Result<(), BioThermalError> {
        self.actuators_working()?;
        self.calls
            .lock()
            .unwrap()
            .push(format!("set_temperature {entity_id} {temperature:.2}"));
        Ok(())
    }
}

/// Classifier returning a fixed zone, or failing, and remembering its inputs.
pub(crate) struct StubClassifier {
    zone: Option<ComfortZone>,
    seen: Mutex<Vec<FeatureVector>>,
}

impl StubClassifier {
    pub fn fixed(zone: ComfortZone) -> Self {
        Self {
            zone: Some(zone),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            zone: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn last_features(&self) -> Option<FeatureVector> {
        self.seen.lock().unwrap().last().copied()
    }

    pub fn last_wrist(&self) -> Option<f64> {
        self.last_features()
            .and_then(|features| features.get(Feature::WristTempInCelsius))
    }
}

impl ComfortClassifier for StubClassifier {
    fn name(&self) -> &str {
        "stub"
    }

    fn predict(&self, features: &FeatureVector) -> Result<ComfortZone, BioThermalError> {
        self.seen.lock().unwrap().push(*features);
        self.zone
            .ok_or_else(|| ModelError::Invalid("stub model has no estimators").into())
    }
}

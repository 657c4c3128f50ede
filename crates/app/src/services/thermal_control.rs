//! Thermal control service: use-cases for the closed-loop control API.

use serde::Serialize;
use tokio::sync::Mutex;

use biothermal_domain::climate::HvacMode;
use biothermal_domain::comfort::ComfortZone;
use biothermal_domain::control::{DecisionRecord, Observation, ThermalController};
use biothermal_domain::entity_id::EntityId;
use biothermal_domain::error::{BioThermalError, NotFoundError, ValidationError};
use biothermal_domain::features::FeatureVector;
use biothermal_domain::time::now;
use biothermal_domain::wearable::{WINDOW_SECS, WearableSample, aggregate_windows};

use crate::ports::{ComfortClassifier, HomeAssistant};

/// Control loop settings.
#[derive(Debug, Clone, Copy)]
pub struct ControlSettings {
    /// Send HVAC commands to HomeAssistant. When `false`, actions are only logged.
    pub enabled: bool,
    pub history_hours: u32,
}

/// Current state of the control loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlStatus {
    pub enabled: bool,
    pub optimal_room_temp: f64,
    pub user_set: bool,
    pub last_decision: Option<DecisionRecord>,
    pub observations: usize,
}

/// Application service that turns wearable data into HVAC actions.
pub struct ThermalControlService<H, C> {
    home_assistant: H,
    classifier: C,
    settings: ControlSettings,
    controller: Mutex<ThermalController>,
}

impl<H: HomeAssistant, C: ComfortClassifier> ThermalControlService<H, C> {
    pub fn new(home_assistant: H, classifier: C, settings: ControlSettings) -> Self {
        Self {
            home_assistant,
            classifier,
            settings,
            controller: Mutex::new(ThermalController::new(now(), settings.history_hours)),
        }
    }

    /// Classify a batch of wearable samples against the room of `thermostat`,
    /// decide and apply the resulting actions.
    ///
    /// # Errors
    ///
    /// Returns [`BioThermalError::Validation`] for an empty batch, a feedback
    /// value outside `-2..=2` or a missing thermostat; fetch and model errors
    /// are propagated. Observations are kept even when applying fails, the
    /// decision is not.
    #[tracing::instrument(skip(self, samples), fields(samples = samples.len()))]
    pub async fn ingest(
        &self,
        samples: &[WearableSample],
        user_feedback: Option<i64>,
        thermostat: Option<&EntityId>,
    ) -> Result<DecisionRecord, BioThermalError> {
        let feedback = user_feedback
            .map(|value| {
                ComfortZone::try_from(value).map_err(|_| ValidationError::FeedbackOutOfRange(value))
            })
            .transpose()?;
        let windows = aggregate_windows(samples, WINDOW_SECS)?;
        let thermostat = thermostat.ok_or(ValidationError::NoThermostatSelected)?;
        let room = self.home_assistant.fetch_climate(thermostat).await?.clipped();

        let mut observations = windows
            .iter()
            .map(|window| -> Result<Observation, BioThermalError> {
                let features = FeatureVector::from_window(window).with_room(&room);
                Ok(Observation {
                    recorded_at: window.start,
                    wrist_temp: window.wrist_temp_in_celsius,
                    room_temp: room.temperature,
                    humidity: room.humidity,
                    zone: self.classifier.predict(&features)?,
                    feedback: None,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(newest) = observations.last_mut() {
            newest.feedback = feedback;
        }

        let mut controller = self.controller.lock().await;
        controller.record(observations);
        // decided on a copy, committed once HomeAssistant accepted the actions
        let mut pending = controller.clone();
        let decision = pending
            .decide(now())
            .ok_or(ValidationError::EmptySamples)?;
        tracing::info!(
            heat = decision.actions.heat,
            cool = decision.actions.cool,
            humidify = decision.actions.humidify,
            dry = decision.actions.dry,
            optimal = decision.optimal_room_temp,
            "thermal decision"
        );
        self.apply(thermostat, &decision).await?;
        *controller = pending;
        Ok(decision)
    }

    /// Set the user's preferred room temperature.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RoomTemperatureOutOfRange`] for implausible values.
    #[tracing::instrument(skip(self))]
    pub async fn set_room_temperature(&self, room_temp: f64) -> Result<ControlStatus, BioThermalError> {
        let mut controller = self.controller.lock().await;
        controller.comfort_mut().apply_preference(room_temp)?;
        Ok(self.status_of(&controller))
    }

    /// Undo the last decision: re-apply the one before it and restore the
    /// previous optimal temperature.
    ///
    /// # Errors
    ///
    /// Returns [`BioThermalError::NotFound`] when fewer than two decisions
    /// were taken, [`ValidationError::NoThermostatSelected`] without a
    /// thermostat, or a fetch error from applying the actions. A failed
    /// rollback leaves the controller untouched.
    #[tracing::instrument(skip(self))]
    pub async fn rollback(&self, thermostat: Option<&EntityId>) -> Result<DecisionRecord, BioThermalError> {
        let thermostat = thermostat.ok_or(ValidationError::NoThermostatSelected)?;
        let mut controller = self.controller.lock().await;
        let mut pending = controller.clone();
        let decision = pending.rollback(now()).ok_or_else(|| NotFoundError {
            entity: "Decision",
            id: "previous".to_string(),
        })?;
        self.apply(thermostat, &decision).await?;
        *controller = pending;
        tracing::info!(optimal = decision.optimal_room_temp, "rolled back last decision");
        Ok(decision)
    }

    pub async fn status(&self) -> ControlStatus {
        let controller = self.controller.lock().await;
        self.status_of(&controller)
    }

    fn status_of(&self, controller: &ThermalController) -> ControlStatus {
        ControlStatus {
            enabled: self.settings.enabled,
            optimal_room_temp: controller.comfort().optimal_room_temp,
            user_set: controller.comfort().user_set,
            last_decision: controller.last_decision().cloned(),
            observations: controller.history_len(),
        }
    }

    async fn apply(&self, thermostat: &EntityId, decision: &DecisionRecord) -> Result<(), BioThermalError> {
        let actions = decision.actions;
        let mode = if actions.heat {
            Some(HvacMode::Heat)
        } else if actions.cool {
            Some(HvacMode::Cool)
        } else {
            None
        };

        if let Some(mode) = mode {
            if self.settings.enabled {
                self.home_assistant.set_hvac_mode(thermostat, mode).await?;
                self.home_assistant
                    .set_temperature(thermostat, decision.optimal_room_temp)
                    .await?;
                tracing::info!(%thermostat, %mode, target = decision.optimal_room_temp, "thermostat updated");
            } else {
                tracing::info!(%thermostat, %mode, target = decision.optimal_room_temp, "control disabled, not sending");
            }
        }
        if actions.humidify {
            tracing::info!("humidifying requested, no humidifier configured");
        } else if actions.dry {
            tracing::info!("drying requested, no window opener configured");
        }
        Ok(())
    }
}

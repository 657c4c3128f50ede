//! Dashboard service: keeps the snapshot the dashboard renders.
//!
//! [`DashboardService::refresh`] is one poll cycle: it fetches readings,
//! the room climate of the selected thermostat and the thermostat list from
//! HomeAssistant, runs the classifier and stores the outcome in a shared
//! [`DashboardSnapshot`]. Handlers only ever read that snapshot.

use serde::Serialize;
use tokio::sync::futures::Notified;
use tokio::sync::{Notify, RwLock};

use biothermal_domain::climate::RoomClimate;
use biothermal_domain::comfort::{ClassifierDecision, ComfortZone};
use biothermal_domain::entity_id::EntityId;
use biothermal_domain::error::{BioThermalError, ValidationError};
use biothermal_domain::features::FeatureVector;
use biothermal_domain::reading::Reading;
use biothermal_domain::thermostat::{Thermostat, ThermostatSelection};
use biothermal_domain::time::{Timestamp, now};

use crate::ports::{ComfortClassifier, HomeAssistant};

/// Entities the dashboard polls.
#[derive(Debug, Clone)]
pub struct SensorSettings {
    pub wrist_temperature: EntityId,
    pub heart_rate: Option<EntityId>,
}

/// How current the displayed readings are.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Freshness {
    /// No refresh has completed yet.
    Pending,
    Fresh { at: Timestamp },
    /// The last refresh failed; the values shown are from an earlier one.
    Stale { reason: String, since: Timestamp },
}

impl Freshness {
    #[must_use]
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }
}

/// Outcome of the classifier for the current readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DecisionStatus {
    Pending,
    Available {
        zone: ComfortZone,
        decision: ClassifierDecision,
        model: String,
    },
    Unavailable { reason: String },
}

/// Everything the dashboard page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub wrist: Option<Reading>,
    pub heart_rate: Option<Reading>,
    pub room: Option<RoomClimate>,
    pub decision: DecisionStatus,
    pub freshness: Freshness,
    pub thermostats: Vec<Thermostat>,
    pub selection: ThermostatSelection,
}

impl DashboardSnapshot {
    fn new(selection: ThermostatSelection) -> Self {
        Self {
            wrist: None,
            heart_rate: None,
            room: None,
            decision: DecisionStatus::Pending,
            freshness: Freshness::Pending,
            thermostats: Vec::new(),
            selection,
        }
    }
}

/// Application service behind the dashboard page and its JSON API.
pub struct DashboardService<H, C> {
    home_assistant: H,
    classifier: C,
    sensors: SensorSettings,
    snapshot: RwLock<DashboardSnapshot>,
    wake: Notify,
}

impl<H: HomeAssistant, C: ComfortClassifier> DashboardService<H, C> {
    /// Create a new service with an initial thermostat selection.
    pub fn new(
        home_assistant: H,
        classifier: C,
        sensors: SensorSettings,
        selection: ThermostatSelection,
    ) -> Self {
        Self {
            home_assistant,
            classifier,
            sensors,
            snapshot: RwLock::new(DashboardSnapshot::new(selection)),
            wake: Notify::new(),
        }
    }

    /// A copy of the current snapshot.
    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.snapshot.read().await.clone()
    }

    pub async fn selection(&self) -> ThermostatSelection {
        self.snapshot.read().await.selection.clone()
    }

    pub async fn thermostats(&self) -> Vec<Thermostat> {
        self.snapshot.read().await.thermostats.clone()
    }

    /// Completes when the selection changed and a refresh is due.
    pub fn selection_changed(&self) -> Notified<'_> {
        self.wake.notified()
    }

    /// Change the selected thermostat, or clear it with `None`.
    ///
    /// The id must be one of the thermostats HomeAssistant reported. The
    /// room climate of the previous selection is dropped and the poller is
    /// woken so the new selection is fetched without waiting for the next tick.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownThermostat`] for ids not in the
    /// current thermostat list, or [`ValidationError::WrongDomain`] for
    /// non-climate entities.
    #[tracing::instrument(skip(self))]
    pub async fn select_thermostat(
        &self,
        entity_id: Option<EntityId>,
    ) -> Result<ThermostatSelection, BioThermalError> {
        let mut snapshot = self.snapshot.write().await;
        let selection = match entity_id {
            None => ThermostatSelection::none(),
            Some(id) => {
                if !snapshot.thermostats.iter().any(|t| t.entity_id == id) {
                    return Err(ValidationError::UnknownThermostat(id.to_string()).into());
                }
                ThermostatSelection::select(id)?
            }
        };
        if snapshot.selection != selection {
            snapshot.selection = selection.clone();
            snapshot.room = None;
            self.wake.notify_one();
        }
        Ok(selection)
    }

    /// Run one poll cycle.
    ///
    /// Never fails: a fetch failure keeps the previous values and marks the
    /// snapshot stale, a model failure marks the decision unavailable.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self) {
        let selection = self.selection().await;

        let thermostats = self.home_assistant.list_thermostats().await;
        let wrist = self
            .home_assistant
            .fetch_reading(&self.sensors.wrist_temperature)
            .await;
        let heart_rate = match &self.sensors.heart_rate {
            Some(id) => Some(self.home_assistant.fetch_reading(id).await),
            None => None,
        };
        let room = match selection.entity_id() {
            Some(id) => Some(self.home_assistant.fetch_climate(id).await),
            None => None,
        };

        let mut snapshot = self.snapshot.write().await;
        let mut failure: Option<BioThermalError> = None;

        match thermostats {
            Ok(list) => snapshot.thermostats = list,
            Err(err) => tracing::warn!(error = %err.report(), "listing thermostats failed"),
        }
        match wrist {
            Ok(reading) => snapshot.wrist = Some(reading),
            Err(err) => failure = Some(err),
        }
        match heart_rate {
            Some(Ok(reading)) => snapshot.heart_rate = Some(reading),
            Some(Err(err)) => {
                failure.get_or_insert(err);
            }
            None => snapshot.heart_rate = None,
        }
        // a selection made while fetching supersedes this cycle's climate
        if snapshot.selection == selection {
            match room {
                Some(Ok(climate)) => snapshot.room = Some(climate.clipped()),
                Some(Err(err)) => {
                    failure.get_or_insert(err);
                }
                None => snapshot.room = None,
            }
        }

        let at = now();
        match failure {
            Some(err) => {
                let reason = err.report();
                tracing::warn!(error = %reason, "dashboard refresh failed, showing stale data");
                let since = match &snapshot.freshness {
                    Freshness::Stale { since, .. } => *since,
                    _ => at,
                };
                snapshot.freshness = Freshness::Stale { reason, since };
            }
            None => {
                snapshot.decision = self.classify(&snapshot);
                snapshot.freshness = Freshness::Fresh { at };
            }
        }
    }

    fn classify(&self, snapshot: &DashboardSnapshot) -> DecisionStatus {
        let Some(wrist) = &snapshot.wrist else {
            return DecisionStatus::Pending;
        };
        let mut features = FeatureVector::from_wrist(wrist);
        if let Some(room) = &snapshot.room {
            features = features.with_room(room);
        }
        if let Some(heart_rate) = &snapshot.heart_rate {
            features = features.with_heart_rate(heart_rate.value);
        }
        match self.classifier.predict(&features) {
            Ok(zone) => {
                let decision = ClassifierDecision::from(zone);
                tracing::info!(%zone, %decision, "classifier decision");
                DecisionStatus::Available {
                    zone,
                    decision,
                    model: self.classifier.name().to_string(),
                }
            }
            Err(err) => {
                let reason = err.report();
                tracing::warn!(error = %reason, "classifier failed");
                DecisionStatus::Unavailable { reason }
            }
        }
    }
}

//! Thermal control rules.
//!
//! A decision is taken in three passes over the newest observation:
//!
//! 1. range checks on room temperature, skin temperature and humidity;
//! 2. when neither heating nor cooling came out of the range checks, the
//!    classifier's recent predictions and the user's feedback move the
//!    optimal room temperature and pick heat or cool;
//! 3. actions that contradict a decision taken less than
//!    [`CONTRADICTION_WINDOW_MINS`] ago are dropped.

use std::collections::VecDeque;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::comfort::{ClassifierDecision, ComfortZone, MAX_ROOM_TEMP, MIN_ROOM_TEMP, UserComfort};
use crate::time::Timestamp;

pub const MIN_SKIN_TEMP: f64 = 30.0;
pub const MAX_SKIN_TEMP: f64 = 38.0;
pub const MIN_HUMIDITY: f64 = 20.0;
pub const MAX_HUMIDITY: f64 = 80.0;

/// Number of recent predictions whose mode drives the low-level pass.
pub const CLASSIFIER_LAG_WINDOW: usize = 12;

/// Minutes during which an opposite action is blocked.
pub const CONTRADICTION_WINDOW_MINS: i64 = 30;

/// On/off flags for the four actuators.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThermalActions {
    pub heat: bool,
    pub cool: bool,
    pub humidify: bool,
    pub dry: bool,
}

impl ThermalActions {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !(self.heat || self.cool || self.humidify || self.dry)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Proposal {
    Heat,
    Cool,
}

fn check_range(value: f64, min: f64, max: f64) -> Option<Proposal> {
    if value < min {
        Some(Proposal::Heat)
    } else if value > max {
        Some(Proposal::Cool)
    } else {
        None
    }
}

/// Range checks on the newest observation.
#[must_use]
pub fn high_level(room_temp: f64, skin_temp: f64, humidity: Option<f64>) -> ThermalActions {
    let room = check_range(room_temp, MIN_ROOM_TEMP, MAX_ROOM_TEMP);
    let skin = check_range(skin_temp, MIN_SKIN_TEMP, MAX_SKIN_TEMP);
    let heat = Some(Proposal::Heat);
    let cool = Some(Proposal::Cool);

    let mut actions = ThermalActions::default();
    if (room == cool && skin != heat) || (room != heat && skin == cool) {
        actions.cool = true;
    } else if (room == heat && skin != cool) || (room != cool && skin == heat) {
        actions.heat = true;
    }

    match humidity {
        Some(h) if h < MIN_HUMIDITY => actions.humidify = true,
        Some(h) if h > MAX_HUMIDITY => actions.dry = true,
        _ => {}
    }
    actions
}

/// Most frequent zone, ties going to the coldest one.
#[must_use]
pub fn most_common_zone(zones: impl IntoIterator<Item = ComfortZone>) -> Option<ComfortZone> {
    let mut counts = [0_usize; 5];
    for zone in zones {
        counts[ComfortZone::ALL.iter().position(|z| *z == zone).unwrap_or_default()] += 1;
    }
    let best = counts.iter().copied().max().filter(|c| *c > 0)?;
    ComfortZone::ALL
        .into_iter()
        .zip(counts)
        .find(|(_, count)| *count == best)
        .map(|(zone, _)| zone)
}

fn feels_warm(feedback: ComfortZone, mode: ComfortZone, last: Option<ComfortZone>) -> bool {
    feedback == ComfortZone::Hot
        || (feedback == ComfortZone::Warm
            && (mode == ComfortZone::Warm
                || matches!(last, None | Some(ComfortZone::Warm | ComfortZone::Neutral))))
}

fn feels_cold(feedback: ComfortZone, mode: ComfortZone, last: Option<ComfortZone>) -> bool {
    feedback == ComfortZone::Cold
        || (feedback == ComfortZone::Cool
            && (mode == ComfortZone::Cool
                || matches!(last, None | Some(ComfortZone::Cool | ComfortZone::Neutral))))
}

/// Classifier- and feedback-driven pass. Shifts the optimal temperature of
/// `comfort` as a side effect.
pub fn low_level(
    comfort: &mut UserComfort,
    mode: ComfortZone,
    feedback: Option<ComfortZone>,
    last_feedback: Option<ComfortZone>,
) -> ThermalActions {
    let mut actions = ThermalActions::default();
    match feedback {
        None => {
            comfort.shift_towards(mode);
            // Hot and Cold act like Warm and Cool here; only Neutral leaves the HVAC idle
            match ClassifierDecision::from(mode) {
                ClassifierDecision::Heat => actions.heat = true,
                ClassifierDecision::Cool => actions.cool = true,
                ClassifierDecision::Idle => {}
            }
        }
        Some(feedback) if feels_warm(feedback, mode, last_feedback) => {
            comfort.shift_towards(feedback);
            actions.cool = true;
        }
        Some(feedback) if feels_cold(feedback, mode, last_feedback) => {
            comfort.shift_towards(feedback);
            actions.heat = true;
        }
        Some(_) => {}
    }
    actions
}

/// Drop actions opposing `previous` when it is less than
/// [`CONTRADICTION_WINDOW_MINS`] old.
#[must_use]
pub fn guard_contradictions(
    mut current: ThermalActions,
    previous: &DecisionRecord,
    now: Timestamp,
) -> ThermalActions {
    let earliest = now - Duration::minutes(CONTRADICTION_WINDOW_MINS);
    if previous.decided_at <= earliest {
        return current;
    }
    let last = previous.actions;
    if last.heat && current.cool {
        current.cool = false;
    } else if last.cool && current.heat {
        current.heat = false;
    }
    if last.humidify && current.dry {
        current.dry = false;
    } else if last.dry && current.humidify {
        current.humidify = false;
    }
    current
}

/// One classified observation of the person and the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub recorded_at: Timestamp,
    pub wrist_temp: f64,
    pub room_temp: f64,
    pub humidity: Option<f64>,
    pub zone: ComfortZone,
    pub feedback: Option<ComfortZone>,
}

/// An applied set of actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub decided_at: Timestamp,
    pub actions: ThermalActions,
    pub optimal_room_temp: f64,
    pub room_temp: f64,
    pub humidity: Option<f64>,
}

/// Rolling state of the control loop for one person.
#[derive(Debug, Clone)]
pub struct ThermalController {
    comfort: UserComfort,
    history: VecDeque<Observation>,
    history_window: Duration,
    last_feedback: Option<ComfortZone>,
    last: Option<DecisionRecord>,
    previous: Option<DecisionRecord>,
}

impl ThermalController {
    /// Start with the season's optimum for `now`, keeping `history_hours` of
    /// observations.
    #[must_use]
    pub fn new(now: Timestamp, history_hours: u32) -> Self {
        Self {
            comfort: UserComfort::for_season(now),
            history: VecDeque::new(),
            history_window: Duration::hours(i64::from(history_hours)),
            last_feedback: None,
            last: None,
            previous: None,
        }
    }

    #[must_use]
    pub fn comfort(&self) -> &UserComfort {
        &self.comfort
    }

    pub fn comfort_mut(&mut self) -> &mut UserComfort {
        &mut self.comfort
    }

    #[must_use]
    pub fn last_decision(&self) -> Option<&DecisionRecord> {
        self.last.as_ref()
    }

    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Append observations, keeping them sorted and within the history window
    /// of the newest one.
    pub fn record(&mut self, observations: impl IntoIterator<Item = Observation>) {
        self.history.extend(observations);
        self.history
            .make_contiguous()
            .sort_by_key(|observation| observation.recorded_at);
        if let Some(newest) = self.history.back().map(|o| o.recorded_at) {
            let cutoff = newest - self.history_window;
            while self
                .history
                .front()
                .is_some_and(|oldest| oldest.recorded_at <= cutoff)
            {
                self.history.pop_front();
            }
        }
    }

    /// Decide on the newest observation. Returns `None` without observations.
    pub fn decide(&mut self, now: Timestamp) -> Option<DecisionRecord> {
        let latest = self.history.back()?.clone();
        self.comfort.refresh_season(now);

        let mut actions = high_level(latest.room_temp, latest.wrist_temp, latest.humidity);
        if !actions.heat && !actions.cool {
            let recent = self
                .history
                .iter()
                .rev()
                .take(CLASSIFIER_LAG_WINDOW)
                .map(|o| o.zone);
            let mode = most_common_zone(recent).unwrap_or(latest.zone);
            let low = low_level(&mut self.comfort, mode, latest.feedback, self.last_feedback);
            self.last_feedback = latest.feedback;
            actions.heat = low.heat;
            actions.cool = low.cool;
        }
        if let Some(last) = &self.last {
            actions = guard_contradictions(actions, last, now);
        }

        let record = DecisionRecord {
            decided_at: now,
            actions,
            optimal_room_temp: self.comfort.optimal_room_temp,
            room_temp: latest.room_temp,
            humidity: latest.humidity,
        };
        self.previous = self.last.replace(record.clone());
        Some(record)
    }

    /// Re-instate the decision taken before the last one and restore the
    /// previous optimum. Returns `None` when there is nothing to roll back.
    pub fn rollback(&mut self, now: Timestamp) -> Option<DecisionRecord> {
        let previous = self.previous.clone()?;
        self.comfort.rollback();
        let record = DecisionRecord {
            decided_at: now,
            optimal_room_temp: self.comfort.optimal_room_temp,
            ..previous
        };
        self.last = Some(record.clone());
        Some(record)
    }
}

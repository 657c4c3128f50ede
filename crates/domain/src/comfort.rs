//! Thermal comfort: classifier zones, decisions and the optimal room temperature.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time::{Season, Timestamp};

/// Lowest room temperature the control loop will ever target, in °C.
pub const MIN_ROOM_TEMP: f64 = 18.0;
/// Highest room temperature the control loop will ever target, in °C.
pub const MAX_ROOM_TEMP: f64 = 26.0;

/// Accepted range for a user-provided optimal room temperature, in °C.
pub const USER_ROOM_TEMP_RANGE: (f64, f64) = (10.0, 35.0);

/// Thermal sensation on the ASHRAE-like `-2..=2` scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum ComfortZone {
    Cold,
    Cool,
    Neutral,
    Warm,
    Hot,
}

impl ComfortZone {
    /// All zones from coldest to hottest.
    pub const ALL: [Self; 5] = [Self::Cold, Self::Cool, Self::Neutral, Self::Warm, Self::Hot];

    #[must_use]
    pub fn value(self) -> i64 {
        match self {
            Self::Cold => -2,
            Self::Cool => -1,
            Self::Neutral => 0,
            Self::Warm => 1,
            Self::Hot => 2,
        }
    }

    /// Range of ASHRAE values whose room temperatures bring a person who
    /// feels `self` back towards neutral.
    #[must_use]
    pub fn target_ashrae_range(self) -> (f64, f64) {
        match self {
            Self::Cold => (2.0, 3.0),
            Self::Cool => (1.0, 2.0),
            Self::Neutral => (-1.0, 1.0),
            Self::Warm => (-2.0, -1.0),
            Self::Hot => (-3.0, -2.0),
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Cold => "cold",
            Self::Cool => "cool",
            Self::Neutral => "neutral",
            Self::Warm => "warm",
            Self::Hot => "hot",
        }
    }
}

impl TryFrom<i64> for ComfortZone {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -2 => Ok(Self::Cold),
            -1 => Ok(Self::Cool),
            0 => Ok(Self::Neutral),
            1 => Ok(Self::Warm),
            2 => Ok(Self::Hot),
            other => Err(ValidationError::ZoneOutOfRange(other)),
        }
    }
}

impl From<ComfortZone> for i64 {
    fn from(zone: ComfortZone) -> Self {
        zone.value()
    }
}

impl std::fmt::Display for ComfortZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:+})", self.label(), self.value())
    }
}

/// What the classifier suggests doing with the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassifierDecision {
    Heat,
    Cool,
    Idle,
}

impl From<ComfortZone> for ClassifierDecision {
    fn from(zone: ComfortZone) -> Self {
        match zone.value() {
            v if v < 0 => Self::Heat,
            v if v > 0 => Self::Cool,
            _ => Self::Idle,
        }
    }
}

impl std::fmt::Display for ClassifierDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Heat => f.write_str("HEAT"),
            Self::Cool => f.write_str("COOL"),
            Self::Idle => f.write_str("IDLE"),
        }
    }
}

/// Optimal room temperature for a season when the user has not set one.
#[must_use]
pub fn season_optimal_temperature(season: Season) -> f64 {
    match season {
        Season::Spring | Season::Autumn => 21.0,
        Season::Summer => 20.0,
        Season::Winter => 22.0,
    }
}

/// ASHRAE-like sensation value of a room at `room_temp` for someone whose
/// optimum is `optimal`, truncated toward zero into `-3..=3`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn ashrae_value(room_temp: f64, optimal: f64) -> i64 {
    let logistic = 2.0 / (1.0 + (-(room_temp - optimal)).exp());
    (3.0 * (logistic - 1.0)).trunc() as i64
}

/// The user's comfort preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserComfort {
    pub optimal_room_temp: f64,
    pub rollback_optimal_room_temp: Option<f64>,
    pub user_set: bool,
}

impl UserComfort {
    /// Start from the season default for `at`.
    #[must_use]
    pub fn for_season(at: Timestamp) -> Self {
        Self {
            optimal_room_temp: season_optimal_temperature(Season::of(at)),
            rollback_optimal_room_temp: None,
            user_set: false,
        }
    }

    /// Replace the optimum, remembering the previous one for rollback.
    pub fn set_optimal(&mut self, temp: f64) {
        self.rollback_optimal_room_temp = Some(self.optimal_room_temp);
        self.optimal_room_temp = temp;
        self.user_set = true;
    }

    /// Validate and apply a user-provided preference.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::RoomTemperatureOutOfRange`] for non-finite
    /// values or values outside [`USER_ROOM_TEMP_RANGE`].
    pub fn apply_preference(&mut self, temp: f64) -> Result<(), ValidationError> {
        if !temp.is_finite() || temp < USER_ROOM_TEMP_RANGE.0 || temp > USER_ROOM_TEMP_RANGE.1 {
            return Err(ValidationError::RoomTemperatureOutOfRange(temp));
        }
        self.set_optimal(temp);
        Ok(())
    }

    /// Follow the season default unless an optimum was set explicitly.
    pub fn refresh_season(&mut self, at: Timestamp) {
        if !self.user_set {
            self.optimal_room_temp = season_optimal_temperature(Season::of(at));
        }
    }

    /// Restore the optimum that was active before the last change.
    pub fn rollback(&mut self) {
        if let Some(previous) = self.rollback_optimal_room_temp {
            self.set_optimal(previous);
        }
    }

    /// Move the optimum so that a person feeling `zone` is steered back to
    /// comfort. Returns the new optimum, or `None` when no temperature in
    /// [`MIN_ROOM_TEMP`]..=[`MAX_ROOM_TEMP`] lands in the target range.
    pub fn shift_towards(&mut self, zone: ComfortZone) -> Option<f64> {
        let (low, high) = zone.target_ashrae_range();
        let optimal = self.optimal_room_temp;
        let mut first = None;
        let mut last = None;
        for temp in candidate_room_temperatures() {
            #[allow(clippy::cast_precision_loss)]
            let value = ashrae_value(temp, optimal) as f64;
            if (low..=high).contains(&value) {
                first.get_or_insert(temp);
                last = Some(temp);
            }
        }
        let new_optimal = (first? + last?) / 2.0;
        self.set_optimal(new_optimal);
        Some(new_optimal)
    }
}

/// `MIN_ROOM_TEMP..=MAX_ROOM_TEMP` in 0.01 °C steps.
fn candidate_room_temperatures() -> impl Iterator<Item = f64> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let steps = ((MAX_ROOM_TEMP - MIN_ROOM_TEMP) * 100.0).round() as u32;
    (0..=steps).map(|i| MIN_ROOM_TEMP + f64::from(i) / 100.0)
}

//! Room climate as reported by a `climate.*` thermostat entity.

use serde::{Deserialize, Serialize};

use crate::entity_id::EntityId;
use crate::time::Timestamp;

/// Accepted room temperature range in °C; readings are clipped into it.
pub const ROOM_TEMP_CLIP: (f64, f64) = (10.0, 45.0);

/// Accepted relative humidity range in %; readings are clipped into it.
pub const ROOM_HUMIDITY_CLIP: (f64, f64) = (0.0, 100.0);

/// HVAC operating mode of a thermostat, as HomeAssistant names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacMode {
    Off,
    Heat,
    Cool,
    HeatCool,
    Auto,
    Dry,
    FanOnly,
    #[default]
    #[serde(other)]
    Unknown,
}

impl HvacMode {
    /// The wire name used by HomeAssistant service calls.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Heat => "heat",
            Self::Cool => "cool",
            Self::HeatCool => "heat_cool",
            Self::Auto => "auto",
            Self::Dry => "dry",
            Self::FanOnly => "fan_only",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a HomeAssistant mode name. Unrecognised names map to [`Self::Unknown`].
    #[must_use]
    pub fn from_wire(name: &str) -> Self {
        match name {
            "off" => Self::Off,
            "heat" => Self::Heat,
            "cool" => Self::Cool,
            "heat_cool" => Self::HeatCool,
            "auto" => Self::Auto,
            "dry" => Self::Dry,
            "fan_only" => Self::FanOnly,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for HvacMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a thermostat's view of the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomClimate {
    pub thermostat: EntityId,
    pub temperature: f64,
    pub humidity: Option<f64>,
    pub hvac_mode: HvacMode,
    pub target_temperature: Option<f64>,
    pub recorded_at: Timestamp,
}

impl RoomClimate {
    /// Clip temperature and humidity into their plausible physical ranges.
    #[must_use]
    pub fn clipped(mut self) -> Self {
        self.temperature = self.temperature.clamp(ROOM_TEMP_CLIP.0, ROOM_TEMP_CLIP.1);
        self.humidity = self
            .humidity
            .map(|h| h.clamp(ROOM_HUMIDITY_CLIP.0, ROOM_HUMIDITY_CLIP.1));
        self
    }
}

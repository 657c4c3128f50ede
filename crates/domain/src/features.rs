//! Classifier input features.

use serde::{Deserialize, Serialize};

use crate::climate::RoomClimate;
use crate::reading::Reading;
use crate::wearable::WearableWindow;

/// A named classifier input, in the order the model was trained with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    WristTempInCelsius,
    RoomTempInCelsius,
    WristRoomTempDeltaInCelsius,
    RoomHumidityInPct,
    HeartRateInBpm,
    IbiInMs,
    SdnnInMs,
}

impl Feature {
    pub const ALL: [Self; 7] = [
        Self::WristTempInCelsius,
        Self::RoomTempInCelsius,
        Self::WristRoomTempDeltaInCelsius,
        Self::RoomHumidityInPct,
        Self::HeartRateInBpm,
        Self::IbiInMs,
        Self::SdnnInMs,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::WristTempInCelsius => "wrist_temp_in_celsius",
            Self::RoomTempInCelsius => "room_temp_in_celsius",
            Self::WristRoomTempDeltaInCelsius => "wrist_room_temp_delta_in_celsius",
            Self::RoomHumidityInPct => "room_humidity_in_pct",
            Self::HeartRateInBpm => "heart_rate_in_bpm",
            Self::IbiInMs => "ibi_in_ms",
            Self::SdnnInMs => "sdnn_in_ms",
        }
    }

    /// Look a feature up by its trained column name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|feature| feature.name() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One row of classifier input. Missing values are imputed by the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: [Option<f64>; 7],
}

impl FeatureVector {
    #[must_use]
    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.values[feature.index()]
    }

    /// Set a value. Non-finite values are treated as missing.
    pub fn set(&mut self, feature: Feature, value: f64) {
        self.values[feature.index()] = value.is_finite().then_some(value);
    }

    #[must_use]
    pub fn with(mut self, feature: Feature, value: f64) -> Self {
        self.set(feature, value);
        self
    }

    /// Features from the wrist reading alone.
    #[must_use]
    pub fn from_wrist(wrist: &Reading) -> Self {
        Self::default().with(Feature::WristTempInCelsius, wrist.value)
    }

    /// Add the room climate and the derived wrist/room delta.
    #[must_use]
    pub fn with_room(mut self, room: &RoomClimate) -> Self {
        self.set(Feature::RoomTempInCelsius, room.temperature);
        if let Some(humidity) = room.humidity {
            self.set(Feature::RoomHumidityInPct, humidity);
        }
        if let Some(wrist) = self.get(Feature::WristTempInCelsius) {
            self.set(Feature::WristRoomTempDeltaInCelsius, wrist - room.temperature);
        }
        self
    }

    /// Add a heart-rate reading and its inter-beat interval.
    #[must_use]
    pub fn with_heart_rate(mut self, bpm: f64) -> Self {
        self.set(Feature::HeartRateInBpm, bpm);
        if bpm > 0.0 {
            self.set(Feature::IbiInMs, 60_000.0 / bpm);
        }
        self
    }

    /// Features of one aggregated wearable window.
    #[must_use]
    pub fn from_window(window: &WearableWindow) -> Self {
        let mut features = Self::default()
            .with(Feature::WristTempInCelsius, window.wrist_temp_in_celsius)
            .with(Feature::HeartRateInBpm, window.heart_rate_in_bpm)
            .with(Feature::IbiInMs, window.ibi_in_ms);
        if let Some(sdnn) = window.sdnn_in_ms {
            features.set(Feature::SdnnInMs, sdnn);
        }
        features
    }
}

//! Reading: a single timestamped scalar measurement of an entity.

use serde::{Deserialize, Serialize};

use crate::entity_id::EntityId;
use crate::time::Timestamp;

/// A timestamped scalar (temperature, heart rate, …) reported by an entity.
///
/// Produced by polling, immutable once fetched, replaced on the next poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub entity_id: EntityId,
    pub value: f64,
    pub unit: Option<String>,
    pub recorded_at: Timestamp,
}

impl Reading {
    /// Create a builder for a reading of `entity_id`.
    #[must_use]
    pub fn builder(entity_id: EntityId) -> ReadingBuilder {
        ReadingBuilder {
            entity_id,
            value: 0.0,
            unit: None,
            recorded_at: None,
        }
    }

    /// Value followed by its unit, e.g. `33.4 °C`.
    #[must_use]
    pub fn display_value(&self) -> String {
        match &self.unit {
            Some(unit) => format!("{:.1} {unit}", self.value),
            None => format!("{:.1}", self.value),
        }
    }
}

/// Step-by-step builder for [`Reading`].
#[derive(Debug)]
pub struct ReadingBuilder {
    entity_id: EntityId,
    value: f64,
    unit: Option<String>,
    recorded_at: Option<Timestamp>,
}

impl ReadingBuilder {
    #[must_use]
    pub fn value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    #[must_use]
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn recorded_at(mut self, recorded_at: Timestamp) -> Self {
        self.recorded_at = Some(recorded_at);
        self
    }

    /// Consume the builder. `recorded_at` defaults to now.
    #[must_use]
    pub fn build(self) -> Reading {
        Reading {
            entity_id: self.entity_id,
            value: self.value,
            unit: self.unit,
            recorded_at: self.recorded_at.unwrap_or_else(crate::time::now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrist() -> EntityId {
        EntityId::parse("sensor.wrist_temperature").unwrap()
    }

    #[test]
    fn should_build_reading_with_all_fields() {
        let at = crate::time::now();
        let reading = Reading::builder(wrist())
            .value(33.4)
            .unit("\u{b0}C")
            .recorded_at(at)
            .build();

        assert_eq!(reading.entity_id, wrist());
        assert!((reading.value - 33.4).abs() < f64::EPSILON);
        assert_eq!(reading.unit.as_deref(), Some("\u{b0}C"));
        assert_eq!(reading.recorded_at, at);
    }

    #[test]
    fn should_display_value_with_unit() {
        let reading = Reading::builder(wrist()).value(33.44).unit("\u{b0}C").build();
        assert_eq!(reading.display_value(), "33.4 \u{b0}C");
    }

    #[test]
    fn should_display_value_without_unit() {
        let reading = Reading::builder(wrist()).value(61.0).build();
        assert_eq!(reading.display_value(), "61.0");
    }
}

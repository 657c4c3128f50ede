//! Entity state objects as returned by `/api/states`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use biothermal_domain::climate::{HvacMode, RoomClimate};
use biothermal_domain::entity_id::EntityId;
use biothermal_domain::reading::Reading;
use biothermal_domain::thermostat::Thermostat;

use crate::error::HomeAssistantError;

#[derive(Debug, Deserialize)]
pub(crate) struct EntityState {
    pub entity_id: String,
    pub state: String,
    #[serde(default)]
    pub attributes: Attributes,
    pub last_updated: Option<DateTime<Utc>>,
}

/// The subset of attributes the dashboard uses. Everything else is ignored.
///
/// Integrations put whatever they like into attributes, so every field
/// decodes leniently: a value of the wrong type reads as absent instead of
/// failing the whole `/api/states` listing.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Attributes {
    #[serde(default, deserialize_with = "lenient_string")]
    pub unit_of_measurement: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub friendly_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub current_temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub current_humidity: Option<f64>,
    /// Target temperature of a thermostat.
    #[serde(default, deserialize_with = "lenient_number")]
    pub temperature: Option<f64>,
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let number = match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse().ok(),
        _ => None,
    };
    Ok(number.filter(|value: &f64| value.is_finite()))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(value) => Ok(Some(value)),
        _ => Ok(None),
    }
}

impl EntityState {
    fn invalid(self) -> HomeAssistantError {
        HomeAssistantError::InvalidState {
            entity_id: self.entity_id,
            state: self.state,
        }
    }

    fn recorded_at(&self) -> DateTime<Utc> {
        self.last_updated.unwrap_or_else(biothermal_domain::time::now)
    }

    /// Numeric sensor state as a reading.
    pub fn into_reading(self) -> Result<Reading, HomeAssistantError> {
        let entity_id = EntityId::parse(self.entity_id.as_str())?;
        let Some(value) = self.state.trim().parse::<f64>().ok().filter(|v| v.is_finite()) else {
            return Err(self.invalid());
        };
        let mut builder = Reading::builder(entity_id)
            .value(value)
            .recorded_at(self.recorded_at());
        if let Some(unit) = self.attributes.unit_of_measurement {
            builder = builder.unit(unit);
        }
        Ok(builder.build())
    }

    /// Thermostat state as a room climate snapshot.
    pub fn into_climate(self) -> Result<RoomClimate, HomeAssistantError> {
        let thermostat = EntityId::parse(self.entity_id.as_str())?.expect_domain("climate")?;
        let Some(temperature) = self.attributes.current_temperature else {
            return Err(self.invalid());
        };
        Ok(RoomClimate {
            thermostat,
            temperature,
            humidity: self.attributes.current_humidity,
            hvac_mode: HvacMode::from_wire(&self.state),
            target_temperature: self.attributes.temperature,
            recorded_at: self.recorded_at(),
        })
    }

    /// Dropdown option for `climate.*` entities, `None` for anything else.
    pub fn into_thermostat(self) -> Option<Thermostat> {
        let entity_id = EntityId::parse(self.entity_id).ok()?.expect_domain("climate").ok()?;
        let friendly_name = self
            .attributes
            .friendly_name
            .unwrap_or_else(|| entity_id.object_id().replace('_', " "));
        Some(Thermostat {
            entity_id,
            friendly_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> EntityState {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn should_parse_numeric_sensor_state() {
        let state = parse(
            r#"{
                "entity_id": "sensor.wrist_temperature",
                "state": "33.4",
                "attributes": {"unit_of_measurement": "°C", "friendly_name": "Wrist"},
                "last_changed": "2024-03-01T10:00:00+00:00",
                "last_updated": "2024-03-01T10:00:05+00:00"
            }"#,
        );
        let reading = state.into_reading().unwrap();
        assert!((reading.value - 33.4).abs() < f64::EPSILON);
        assert_eq!(reading.unit.as_deref(), Some("°C"));
        assert_eq!(reading.recorded_at.to_rfc3339(), "2024-03-01T10:00:05+00:00");
    }

    #[test]
    fn should_reject_unavailable_state() {
        let state = parse(r#"{"entity_id": "sensor.wrist_temperature", "state": "unavailable"}"#);
        assert!(matches!(
            state.into_reading(),
            Err(HomeAssistantError::InvalidState { state, .. }) if state == "unavailable"
        ));
    }

    #[test]
    fn should_parse_climate_state() {
        let state = parse(
            r#"{
                "entity_id": "climate.office",
                "state": "heat",
                "attributes": {
                    "current_temperature": 20.5,
                    "current_humidity": 41,
                    "temperature": 22,
                    "hvac_modes": ["off", "heat", "cool"],
                    "friendly_name": "Office"
                }
            }"#,
        );
        let climate = state.into_climate().unwrap();
        assert_eq!(climate.hvac_mode, HvacMode::Heat);
        assert_eq!(climate.humidity, Some(41.0));
        assert_eq!(climate.target_temperature, Some(22.0));
    }

    #[test]
    fn should_reject_climate_without_current_temperature() {
        let state = parse(r#"{"entity_id": "climate.office", "state": "off", "attributes": {}}"#);
        assert!(matches!(
            state.into_climate(),
            Err(HomeAssistantError::InvalidState { .. })
        ));
    }

    #[test]
    fn should_ignore_attributes_of_unexpected_type() {
        let states: Vec<EntityState> = serde_json::from_str(
            r#"[
                {"entity_id": "sensor.template_outdoor", "state": "ok",
                 "attributes": {"temperature": "n/a", "current_humidity": [1, 2], "friendly_name": 7}},
                {"entity_id": "climate.office", "state": "heat",
                 "attributes": {"current_temperature": "20.5", "friendly_name": "Office"}}
            ]"#,
        )
        .unwrap();

        let outdoor = &states[0].attributes;
        assert_eq!(outdoor.temperature, None);
        assert_eq!(outdoor.current_humidity, None);
        assert_eq!(outdoor.friendly_name, None);
        let thermostats: Vec<_> = states.into_iter().filter_map(EntityState::into_thermostat).collect();
        assert_eq!(thermostats.len(), 1);
        assert_eq!(thermostats[0].friendly_name, "Office");
    }

    #[test]
    fn should_only_turn_climate_entities_into_thermostats() {
        let sensor = parse(r#"{"entity_id": "sensor.office", "state": "1"}"#);
        assert_eq!(sensor.into_thermostat(), None);

        let climate = parse(r#"{"entity_id": "climate.living_room", "state": "off"}"#);
        let thermostat = climate.into_thermostat().unwrap();
        assert_eq!(thermostat.friendly_name, "living room");
    }
}

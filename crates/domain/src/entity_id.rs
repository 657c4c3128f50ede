//! HomeAssistant entity identifiers (`<domain>.<object_id>`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// A validated HomeAssistant entity id such as `sensor.wrist_temperature`.
///
/// Both halves are non-empty and made of lowercase ASCII letters, digits
/// and `_`, separated by exactly one `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Parse and validate an entity id.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidEntityId`] when `raw` is not of the
    /// form `<domain>.<object_id>`.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        let valid = match raw.split_once('.') {
            Some((domain, object_id)) => is_slug(domain) && is_slug(object_id),
            None => false,
        };
        if valid {
            Ok(Self(raw))
        } else {
            Err(ValidationError::InvalidEntityId(raw))
        }
    }

    /// The part before the dot (`sensor`, `climate`, …).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('.').map_or("", |(domain, _)| domain)
    }

    /// The part after the dot.
    #[must_use]
    pub fn object_id(&self) -> &str {
        self.0.split_once('.').map_or("", |(_, object_id)| object_id)
    }

    /// Require this id to belong to `domain`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::WrongDomain`] otherwise.
    pub fn expect_domain(self, domain: &'static str) -> Result<Self, ValidationError> {
        if self.domain() == domain {
            Ok(self)
        } else {
            Err(ValidationError::WrongDomain {
                entity_id: self.0,
                expected: domain,
            })
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_slug(part: &str) -> bool {
    !part.is_empty()
        && part
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_valid_entity_id() {
        let id = EntityId::parse("sensor.wrist_temperature").unwrap();
        assert_eq!(id.domain(), "sensor");
        assert_eq!(id.object_id(), "wrist_temperature");
        assert_eq!(id.to_string(), "sensor.wrist_temperature");
    }

    #[test]
    fn should_reject_id_without_dot() {
        let result = EntityId::parse("wrist_temperature");
        assert_eq!(
            result,
            Err(ValidationError::InvalidEntityId("wrist_temperature".to_string()))
        );
    }

    #[test]
    fn should_reject_id_with_two_dots() {
        assert!(EntityId::parse("sensor.wrist.temp").is_err());
    }

    #[test]
    fn should_reject_uppercase_and_spaces() {
        assert!(EntityId::parse("Sensor.wrist").is_err());
        assert!(EntityId::parse("sensor.wrist temp").is_err());
    }

    #[test]
    fn should_reject_empty_halves() {
        assert!(EntityId::parse(".wrist").is_err());
        assert!(EntityId::parse("sensor.").is_err());
    }

    #[test]
    fn should_check_expected_domain() {
        let id = EntityId::parse("climate.living_room").unwrap();
        assert!(id.clone().expect_domain("climate").is_ok());
        assert!(matches!(
            id.expect_domain("sensor"),
            Err(ValidationError::WrongDomain { expected: "sensor", .. })
        ));
    }

    #[test]
    fn should_deserialize_and_validate() {
        let id: EntityId = serde_json::from_str("\"climate.bedroom\"").unwrap();
        assert_eq!(id.as_str(), "climate.bedroom");

        let bad: Result<EntityId, _> = serde_json::from_str("\"not an id\"");
        assert!(bad.is_err());
    }
}

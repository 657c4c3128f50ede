//! Thermostat options and the user's current dropdown selection.

use serde::{Deserialize, Serialize};

use crate::entity_id::EntityId;
use crate::error::ValidationError;

/// One entry of the thermostat dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thermostat {
    pub entity_id: EntityId,
    pub friendly_name: String,
}

/// The thermostat the user picked in the dashboard.
///
/// Transient UI state: held in memory, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThermostatSelection(Option<EntityId>);

impl ThermostatSelection {
    #[must_use]
    pub fn none() -> Self {
        Self(None)
    }

    /// Select a thermostat. The id must be in the `climate` domain.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::WrongDomain`] for non-climate entities.
    pub fn select(entity_id: EntityId) -> Result<Self, ValidationError> {
        Ok(Self(Some(entity_id.expect_domain("climate")?)))
    }

    #[must_use]
    pub fn entity_id(&self) -> Option<&EntityId> {
        self.0.as_ref()
    }

    #[must_use]
    pub fn is_selected(&self, entity_id: &EntityId) -> bool {
        self.0.as_ref() == Some(entity_id)
    }
}

//! HomeAssistant adapter error types.

use biothermal_domain::error::{BioThermalError, FetchError, NotFoundError, ValidationError};

/// Errors specific to the HomeAssistant adapter.
#[derive(Debug, thiserror::Error)]
pub enum HomeAssistantError {
    /// The request could not be sent or timed out.
    #[error("request to HomeAssistant failed")]
    Request(#[source] reqwest::Error),

    /// The access token was missing, expired or lacks permissions.
    #[error("HomeAssistant rejected the access token (status {0})")]
    Unauthorized(u16),

    #[error("entity {0} not found")]
    NotFound(String),

    #[error("HomeAssistant answered with status {0}")]
    Status(u16),

    /// The response body is not the JSON we expected.
    #[error("failed to decode HomeAssistant response")]
    Decode(#[source] serde_json::Error),

    /// The entity exists but its state is not usable.
    #[error("entity {entity_id} has unusable state {state:?}")]
    InvalidState { entity_id: String, state: String },

    /// A domain-level error (e.g. a malformed entity id in a response).
    #[error("domain error")]
    Domain(#[source] BioThermalError),
}

impl HomeAssistantError {
    /// Convert into the matching [`BioThermalError`] for propagation across
    /// port boundaries.
    pub fn into_domain(self) -> BioThermalError {
        match self {
            Self::Request(err) => FetchError::Network(Box::new(err)).into(),
            Self::Unauthorized(status) => FetchError::Unauthorized(status).into(),
            Self::NotFound(id) => NotFoundError {
                entity: "Entity",
                id,
            }
            .into(),
            Self::Status(status) => FetchError::Status(status).into(),
            Self::Decode(err) => FetchError::Decode(Box::new(err)).into(),
            Self::InvalidState { entity_id, state } => {
                FetchError::InvalidState { entity_id, state }.into()
            }
            Self::Domain(err) => err,
        }
    }
}

impl From<HomeAssistantError> for BioThermalError {
    fn from(err: HomeAssistantError) -> Self {
        err.into_domain()
    }
}

impl From<ValidationError> for HomeAssistantError {
    fn from(err: ValidationError) -> Self {
        Self::Domain(err.into())
    }
}

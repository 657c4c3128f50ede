//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`BioThermalError`] via `#[from]`. There are no `String` catch-all
//! variants: every failure carries a typed source.

/// Top-level error returned by services and ports.
#[derive(Debug, thiserror::Error)]
pub enum BioThermalError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("fetch error")]
    Fetch(#[from] FetchError),

    #[error("model error")]
    Model(#[from] ModelError),
}

impl BioThermalError {
    /// The error and all its sources, joined with `: `.
    #[must_use]
    pub fn report(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            message.push_str(": ");
            message.push_str(&err.to_string());
            source = err.source();
        }
        message
    }
}

/// A domain invariant was violated by caller-provided data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid entity id {0:?}, expected `<domain>.<object_id>`")]
    InvalidEntityId(String),

    #[error("entity {entity_id} is not in the `{expected}` domain")]
    WrongDomain {
        entity_id: String,
        expected: &'static str,
    },

    #[error("no wearable samples provided")]
    EmptySamples,

    #[error("user feedback {0} is outside -2..=2")]
    FeedbackOutOfRange(i64),

    #[error("comfort zone {0} is outside -2..=2")]
    ZoneOutOfRange(i64),

    #[error("room temperature {0} is outside the accepted range")]
    RoomTemperatureOutOfRange(f64),

    #[error("no thermostat selected")]
    NoThermostatSelected,

    #[error("thermostat {0} is not known")]
    UnknownThermostat(String),
}

/// A lookup for something that does not exist.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Retrieving data from HomeAssistant failed.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request never produced a response (DNS, connect, timeout, …).
    #[error("network failure")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// HomeAssistant rejected the access token.
    #[error("unauthorized (status {0})")]
    Unauthorized(u16),

    /// Any other non-success status code.
    #[error("unexpected status {0}")]
    Status(u16),

    /// The response body could not be decoded.
    #[error("malformed response")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The entity answered, but its state is not a usable number.
    #[error("entity {entity_id} has non-numeric state {state:?}")]
    InvalidState { entity_id: String, state: String },
}

/// The classifier could not produce a prediction.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The model artifact could not be read or decoded.
    #[error("failed to load model artifact")]
    Load(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The artifact decoded but is not a usable model.
    #[error("invalid model artifact: {0}")]
    Invalid(&'static str),

    /// The artifact references a feature this build does not know.
    #[error("model references unknown feature {0:?}")]
    UnknownFeature(String),

    /// A prediction came out outside the comfort-zone scale.
    #[error("model produced out-of-range class {0}")]
    OutOfRange(i64),
}

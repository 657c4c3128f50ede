//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use biothermal_domain::error::{BioThermalError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`BioThermalError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(BioThermalError);

impl From<BioThermalError> for ApiError {
    fn from(err: BioThermalError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            BioThermalError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            BioThermalError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            BioThermalError::Fetch(_) => {
                tracing::error!(error = %self.0.report(), "HomeAssistant request failed");
                (StatusCode::BAD_GATEWAY, self.0.report())
            }
            BioThermalError::Model(_) => {
                tracing::error!(error = %self.0.report(), "classifier failed");
                (StatusCode::SERVICE_UNAVAILABLE, self.0.report())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

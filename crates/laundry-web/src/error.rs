//! API error types with the flat `{"error": ...}` body the front end expects.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Flat error body: `{"error": "<message>"}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, unknown, or expired session.
    #[error("unauthorized")]
    Unauthorized,

    /// Bad login attempt. One message for both fields, so a caller can't
    /// probe which half was wrong.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Request violates a contract constraint; the message names it.
    #[error("{0}")]
    BadRequest(String),

    /// The platform call failed. Surfaced with the error's display form,
    /// matching the contract the front end was built against.
    #[error(transparent)]
    Upstream(#[from] iotda_api::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(err) => {
                tracing::error!(error = %err, "platform call failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

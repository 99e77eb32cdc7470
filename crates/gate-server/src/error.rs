//! HTTP error mapping.
//!
//! `Conflict` and `TransientUpstream` never reach this layer: the former is
//! recovered inside the store, the latter is swallowed with a fallback.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gate_core::GateError;
use serde_json::json;

/// Error surfaced to HTTP callers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "missing or invalid owner token")
    }
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::NotFound(message) => Self::new(StatusCode::NOT_FOUND, message),
            GateError::NotAuthorized => Self::new(StatusCode::FORBIDDEN, "not authorized"),
            // Recovered-internally variants that still escape indicate a bug;
            // answer 500 without leaking detail.
            GateError::Conflict(_) | GateError::TransientUpstream(_) | GateError::Storage(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

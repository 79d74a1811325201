//! API error types and their HTTP mapping.
//!
//! Three kinds of failure leave this service:
//! - validation failures (client data fails a type/range/format check),
//! - constraint violations (the store rejects an insert that passed
//!   validation, e.g. a duplicate `(sensor_id, date)` pair),
//! - storage failures on the read path.
//!
//! All three render as JSON through [`IntoResponse`], so handlers can
//! simply return `Result<_, ApiError>`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

// ---

/// A rejected field on the write or read path.
///
/// Carries the exact human-readable message sent to the client
/// (`"Invalid temperature, must be a number between -50 and 50."`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        ValidationError(message.into())
    }
}

/// Errors surfaced by HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    // ---
    /// Client-supplied data failed a type/range/format check. 400.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The store rejected a write after validation passed. 400.
    #[error("{message}: {detail}")]
    Constraint { message: String, detail: String },

    /// The store failed during a read. 500.
    #[error("{message}: {detail}")]
    Storage { message: String, detail: String },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        // ---
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Constraint { .. } => StatusCode::BAD_REQUEST,
            ApiError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error body: always a `message`, plus the underlying `error` detail
/// when the failure came from the storage layer.
#[derive(Debug, Serialize)]
struct ErrorBody {
    // ---
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // ---
        let status = self.status_code();
        let body = match self {
            ApiError::Validation(ValidationError(message)) => ErrorBody {
                message,
                error: None,
            },
            ApiError::Constraint { message, detail } | ApiError::Storage { message, detail } => {
                ErrorBody {
                    message,
                    error: Some(detail),
                }
            }
        };
        (status, Json(body)).into_response()
    }
}

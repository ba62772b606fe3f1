//! Core error types with HTTP status code mapping.
//!
//! [`CoreError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Mapping from field path to a human-readable validation failure reason.
///
/// Ordered so that error payloads are stable across runs.
pub type FieldErrors = BTreeMap<String, String>;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "payload validation failed",
///     "details": { "team_id": "missing required field" }
///   }
/// }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`CoreError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Per-field validation details, present only for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldErrors>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                  |
/// |-----------|-------------------|------------------------------|
/// | 1000–1999 | Validation        | 400 Bad Request              |
/// | 2000–2999 | State / Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server            | 500 Internal Server Error    |
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Payload failed its per-event-type schema; nothing was persisted.
    #[error("payload validation failed")]
    Validation(FieldErrors),

    /// The submitted event type is not part of the closed enum.
    ///
    /// Deliberately distinct from a payload-shape failure.
    #[error("unknown event type: {0}")]
    UnknownEventType(String),

    /// Request is well-formed but semantically invalid (e.g. the scoring
    /// team is not part of the game).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Game absent under the caller's tenant. Cross-tenant access attempts
    /// produce the same variant so that existence never leaks.
    #[error("game not found")]
    NotFound,

    /// Non-administrative event submitted against a FINAL or CANCELLED game.
    #[error("game is in terminal state {status}")]
    TerminalState {
        /// Terminal status the game is in.
        status: String,
    },

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::UnknownEventType(_) => 1002,
            Self::BadRequest(_) => 1003,
            Self::NotFound => 2001,
            Self::TerminalState { .. } => 2002,
            Self::Persistence(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::UnknownEventType(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::TerminalState { .. } => StatusCode::CONFLICT,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        // Storage internals are reported generically; the log keeps the
        // full message.
        let message = match &self {
            Self::Persistence(detail) => {
                tracing::error!(%detail, "persistence failure");
                "storage failure".to_string()
            }
            other => other.to_string(),
        };
        let details = match self {
            Self::Validation(fields) => Some(fields),
            _ => None,
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message,
                details,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let mut fields = FieldErrors::new();
        fields.insert("team_id".to_string(), "missing required field".to_string());
        let err = CoreError::Validation(fields);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), 1001);
    }

    #[test]
    fn unknown_event_type_is_distinct_from_validation() {
        let err = CoreError::UnknownEventType("GOAL_SCROED".to_string());
        assert_ne!(
            err.error_code(),
            CoreError::Validation(FieldErrors::new()).error_code()
        );
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(CoreError::NotFound.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn terminal_state_maps_to_409() {
        let err = CoreError::TerminalState {
            status: "FINAL".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn persistence_message_is_generic_in_response() {
        let err = CoreError::Persistence("connection refused on 10.0.0.5".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

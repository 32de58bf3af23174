//! Application-level error type for HTTP handlers.
//!
//! Maps handler failures to JSON error responses with appropriate status
//! codes so every REST endpoint reports errors in the same shape.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Result alias for HTTP handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Application error returned by REST handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request was malformed (bad locator format, invalid parameters).
    #[error("{0}")]
    BadRequest(String),

    /// The requested resource does not exist (or has expired).
    #[error("{0}")]
    NotFound(String),

    /// A required backing service is unavailable or misconfigured.
    #[error("{0}")]
    ServiceUnavailable(String),

    /// Unexpected internal failure.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::ServiceUnavailable("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_display_is_message_only() {
        let err = AppError::NotFound("artifact not found: abc".into());
        assert_eq!(err.to_string(), "artifact not found: abc");
    }
}

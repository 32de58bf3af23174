//! Reply artifact download handler.
//!
//! Serves synthesized reply audio at its opaque locator for the artifact's
//! retention window. Read-only: there is no mutation endpoint.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::state::AppState;

fn is_valid_locator(locator: &str) -> bool {
    !locator.is_empty() && !locator.contains("..") && !locator.contains('/')
}

/// Download a reply artifact by locator.
///
/// Returns 404 once the retention window has elapsed; clients are expected
/// to fetch the artifact promptly after receiving the reply message.
pub async fn download_artifact(
    State(state): State<Arc<AppState>>,
    Path(locator): Path<String>,
) -> Result<Response, AppError> {
    if !is_valid_locator(&locator) {
        return Err(AppError::BadRequest("Invalid artifact locator".to_string()));
    }

    debug!(locator = %locator, "Artifact download requested");

    let artifact = state
        .artifacts
        .fetch(&locator)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Artifact not found: {locator}")))?;

    info!(
        locator = %locator,
        bytes = artifact.data.len(),
        "Artifact download successful"
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(artifact.content_type),
    );
    if let Ok(len) = HeaderValue::from_str(&artifact.data.len().to_string()) {
        headers.insert(header::CONTENT_LENGTH, len);
    }
    // Artifacts expire; clients must not serve stale copies past the window
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    Ok((StatusCode::OK, headers, artifact.data).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_locator_empty() {
        assert!(!is_valid_locator(""));
    }

    #[test]
    fn test_invalid_locator_path_traversal() {
        assert!(!is_valid_locator("../etc/passwd"));
        assert!(!is_valid_locator(".."));
    }

    #[test]
    fn test_invalid_locator_contains_slash() {
        assert!(!is_valid_locator("abc/123"));
    }

    #[test]
    fn test_valid_locator_uuid() {
        assert!(is_valid_locator("550e8400-e29b-41d4-a716-446655440000"));
    }
}

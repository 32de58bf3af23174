use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::audio;
use crate::state::AppState;
use std::sync::Arc;

/// Create the REST API router.
///
/// `GET /audio/{locator}` is the read-only fetch path for synthesized reply
/// artifacts; artifacts expire at the end of their retention window.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/audio/{locator}", get(audio::download_artifact))
        .layer(TraceLayer::new_for_http())
}

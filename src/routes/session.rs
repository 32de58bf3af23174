//! Voice session WebSocket route configuration.

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::session::session_handler;
use crate::state::AppState;
use std::sync::Arc;

/// Create the voice session WebSocket router
///
/// # Endpoint
///
/// `GET /session` - WebSocket upgrade for a turn-based voice conversation
///
/// # Protocol
///
/// After the upgrade, the client sends:
/// - Binary frames, each carrying one complete utterance
/// - `{"type": "end_session"}` to end the conversation explicitly
///
/// The server responds per accepted utterance with exactly one of:
/// - `{"type": "audio", "text": "...", "audioUrl": "/audio/<locator>"}`
/// - `{"type": "error", "error": "..."}`
///
/// An utterance that transcribes to silence produces no response; the
/// client simply keeps listening.
pub fn create_session_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/session", get(session_handler))
        .layer(TraceLayer::new_for_http())
}

//! Connection limit middleware for WebSocket connections
//!
//! This module provides middleware to enforce connection limits:
//! - Global maximum WebSocket connections
//! - Per-IP connection limits
//!
//! # Example
//!
//! ```ignore
//! use axum::Router;
//! use solace_gateway::middleware::connection_limit_middleware;
//!
//! let app = Router::new()
//!     .route("/session", get(session_handler))
//!     .layer(axum::middleware::from_fn_with_state(
//!         state.clone(),
//!         connection_limit_middleware,
//!     ));
//! ```

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use crate::state::{AppState, ConnectionLimitError};

/// Extension type to carry the client IP through to the handler
/// so the handler can release the connection when done.
#[derive(Clone, Debug)]
pub struct ClientIp(pub IpAddr);

/// Middleware that enforces connection limits for WebSocket connections.
///
/// This middleware:
/// 1. Checks if the global WebSocket connection limit has been reached
/// 2. Checks if the per-IP connection limit has been reached
/// 3. Returns 503 Service Unavailable if global limit is exceeded
/// 4. Returns 429 Too Many Requests if per-IP limit is exceeded
/// 5. Injects `ClientIp` extension so handlers can release the connection later
///
/// The middleware only applies to WebSocket upgrade requests (detected by the
/// Upgrade header). Non-WebSocket requests pass through without limit checks.
pub async fn connection_limit_middleware(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    // Only apply limits to WebSocket upgrade requests
    let is_ws_upgrade = request
        .headers()
        .get("upgrade")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("websocket"))
        .unwrap_or(false);

    if !is_ws_upgrade {
        return next.run(request).await;
    }

    let client_ip = addr.ip();

    match state.try_acquire_connection(client_ip) {
        Ok(()) => {
            // Connection acquired; the WebSocket handler releases it via
            // the injected ClientIp when the socket closes.
            request.extensions_mut().insert(ClientIp(client_ip));
            next.run(request).await
        }
        Err(ConnectionLimitError::GlobalLimitReached) => {
            tracing::warn!(
                ip = %client_ip,
                "Rejecting connection: global limit reached"
            );
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "Server at capacity. Please try again later.",
            )
                .into_response()
        }
        Err(ConnectionLimitError::PerIpLimitReached) => {
            tracing::warn!(
                ip = %client_ip,
                "Rejecting connection: per-IP limit reached"
            );
            (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many connections from your IP address.",
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_limit_error_debug() {
        assert_eq!(
            format!("{:?}", ConnectionLimitError::GlobalLimitReached),
            "GlobalLimitReached"
        );
        assert_eq!(
            format!("{:?}", ConnectionLimitError::PerIpLimitReached),
            "PerIpLimitReached"
        );
    }

    #[test]
    fn test_client_ip_extension_is_cloneable() {
        let ip = ClientIp(IpAddr::from([127, 0, 0, 1]));
        let copy = ip.clone();
        assert_eq!(copy.0, ip.0);
    }
}

pub mod health;
pub mod webhook;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// All relay routes.
///
/// ```text
/// GET  /health          service health and subscriber count
/// POST /api/webhook     encrypted status callback from the service
/// GET  /test-app        broadcast a test message
/// GET  /ws              subscriber WebSocket
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(webhook::router())
        .route("/ws", get(ws::ws_handler))
}

//! WebSocket transport.
//!
//! The WebSocket listener runs on its own port. Clients upgrade on `/` or
//! `/ws`; each inbound text frame is one command envelope and is answered
//! with one response envelope on the same connection. Server-initiated
//! messages (unicast and broadcast) go through the connection registry.

pub mod connection;
pub mod handler;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::app_state::ListenerContext;

/// Builds the upgrade router for the WebSocket listener.
pub fn build_router(ctx: ListenerContext) -> Router {
    Router::new()
        .route("/", get(handler::ws_handler))
        .route("/ws", get(handler::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

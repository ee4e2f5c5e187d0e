//! Axum WebSocket upgrade handler.

use std::net::SocketAddr;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::connection::run_connection;
use crate::app_state::ListenerContext;
use crate::error::BridgeError;

/// `GET /` and `GET /ws` — Upgrade HTTP connection to WebSocket.
///
/// Answers `503 Service Unavailable` with a failure envelope when the
/// listener is stopping or already at `max_connections`.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(ctx): State<ListenerContext>,
) -> Response {
    if ctx.cancel.is_cancelled() || !ctx.registry.has_capacity().await {
        tracing::warn!(%peer, "ws upgrade refused: at capacity");
        return (StatusCode::SERVICE_UNAVAILABLE, BridgeError::AtCapacity).into_response();
    }

    let tracker = ctx.tracker.clone();
    ws.on_upgrade(move |socket| tracker.track_future(run_connection(socket, peer, ctx)))
}

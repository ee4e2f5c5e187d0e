//! Shared state injected into listeners and Axum handlers.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::domain::ConnectionRegistry;
use crate::router::CommandRouter;

/// State for the HTTP listener, available to handlers via Axum's `State`
/// extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Command router shared by every transport.
    pub router: Arc<CommandRouter>,
}

/// Everything a connection-oriented listener (TCP, WebSocket) and its
/// per-client tasks need.
#[derive(Debug, Clone)]
pub struct ListenerContext {
    /// Command router shared by every transport.
    pub router: Arc<CommandRouter>,
    /// Live clients of this listener.
    pub registry: Arc<ConnectionRegistry>,
    /// Cancelled by `stop_all`; every accept loop and client loop watches
    /// it.
    pub cancel: CancellationToken,
    /// Tracks per-client tasks so shutdown can wait for them.
    pub tracker: TaskTracker,
    /// Clients silent for this long are disconnected.
    pub idle_timeout: Duration,
    /// Capacity of each client's outbound queue.
    pub outbound_capacity: usize,
}

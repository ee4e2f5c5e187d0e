//! Lifecycle owner for the TCP, HTTP and WebSocket listeners.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use super::listener::{RunningListener, start_listener};
use crate::config::ServerConfig;
use crate::domain::{ConnectionId, ConnectionRegistry, ConnectionSummary, Protocol, ServerStatus};
use crate::editor::EditorControl;
use crate::error::BridgeError;
use crate::router::{ActorClassTable, CommandRouter};

#[derive(Debug)]
struct ManagerState {
    config: ServerConfig,
    listeners: HashMap<Protocol, RunningListener>,
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl ManagerState {
    /// Forgets listeners whose serve loop has already exited.
    fn reap_finished(&mut self) {
        self.listeners.retain(|protocol, listener| {
            let alive = listener.is_running();
            if !alive {
                tracing::warn!(%protocol, "listener exited unexpectedly");
            }
            alive
        });
    }
}

/// Owns every listener and the tasks serving their clients.
///
/// All methods take `&self`; internal state sits behind an async mutex so a
/// manager can be shared through an `Arc`. Dropping the manager cancels
/// every listener, but only [`ServerManager::stop_all`] waits for in-flight
/// work to finish.
#[derive(Debug)]
pub struct ServerManager {
    router: Arc<CommandRouter>,
    state: Mutex<ManagerState>,
}

impl ServerManager {
    /// Creates a stopped manager dispatching through `router`.
    #[must_use]
    pub fn new(config: ServerConfig, router: Arc<CommandRouter>) -> Self {
        Self {
            router,
            state: Mutex::new(ManagerState {
                config,
                listeners: HashMap::new(),
                cancel: CancellationToken::new(),
                tracker: TaskTracker::new(),
            }),
        }
    }

    /// Creates a stopped manager whose router drives `editor`, admitting the
    /// actor classes listed in `config`.
    #[must_use]
    pub fn with_editor(config: ServerConfig, editor: Arc<dyn EditorControl>) -> Self {
        let actor_classes = ActorClassTable::new(config.actor_classes.iter().cloned());
        let router = Arc::new(CommandRouter::new(editor, actor_classes));
        Self::new(config, router)
    }

    /// The router shared by every listener.
    #[must_use]
    pub fn router(&self) -> &Arc<CommandRouter> {
        &self.router
    }

    /// Binds and starts every listener that is not already running.
    ///
    /// A listener that fails to bind is logged and left stopped; listeners
    /// that did start are kept. Returns `true` if at least one listener is
    /// running afterwards.
    pub async fn start_all(&self) -> bool {
        let mut state = self.state.lock().await;
        state.reap_finished();

        for protocol in Protocol::ALL {
            if state.listeners.contains_key(&protocol) {
                continue;
            }
            let started = start_listener(
                protocol,
                &state.config,
                &self.router,
                &state.cancel,
                &state.tracker,
            )
            .await;
            match started {
                Ok(listener) => {
                    state.listeners.insert(protocol, listener);
                }
                Err(err) => {
                    tracing::error!(%protocol, code = err.error_code(), "listener failed to start: {err}");
                }
            }
        }

        !state.listeners.is_empty()
    }

    /// Stops every listener and waits until all accept loops and client
    /// tasks have exited.
    ///
    /// Handlers already running are allowed to finish; none runs after this
    /// returns. Calling it on a stopped manager is a no-op.
    pub async fn stop_all(&self) {
        let mut state = self.state.lock().await;
        if state.listeners.is_empty() {
            return;
        }

        state.cancel.cancel();
        let listeners = std::mem::take(&mut state.listeners);
        for (protocol, listener) in listeners {
            if let Err(err) = listener.handle.await {
                tracing::error!(%protocol, error = %err, "listener task aborted");
            }
        }

        state.tracker.close();
        state.tracker.wait().await;

        // Fresh primitives so the manager can be started again.
        state.cancel = CancellationToken::new();
        state.tracker = TaskTracker::new();
        tracing::info!("all listeners stopped");
    }

    /// Whether any listener is accepting.
    pub async fn is_any_running(&self) -> bool {
        let state = self.state.lock().await;
        state.listeners.values().any(RunningListener::is_running)
    }

    /// One snapshot per protocol, stopped listeners included.
    pub async fn status(&self) -> Vec<ServerStatus> {
        let state = self.state.lock().await;
        let mut statuses = Vec::with_capacity(Protocol::ALL.len());
        for protocol in Protocol::ALL {
            let status = match state.listeners.get(&protocol) {
                Some(listener) if listener.is_running() => ServerStatus {
                    protocol,
                    running: true,
                    active_connections: listener.active_connections().await,
                    local_addr: Some(listener.local_addr),
                },
                _ => ServerStatus {
                    protocol,
                    running: false,
                    active_connections: 0,
                    local_addr: None,
                },
            };
            statuses.push(status);
        }
        statuses
    }

    /// Connected TCP and WebSocket clients, summed.
    pub async fn active_connections(&self) -> usize {
        let state = self.state.lock().await;
        let mut total = 0;
        for listener in state.listeners.values() {
            total += listener.active_connections().await;
        }
        total
    }

    /// Summaries of every connected client.
    pub async fn connections(&self) -> Vec<ConnectionSummary> {
        let state = self.state.lock().await;
        let mut all = Vec::new();
        for registry in state.listeners.values().filter_map(|l| l.registry.as_ref()) {
            all.extend(registry.list().await);
        }
        all
    }

    /// Address `protocol`'s listener is bound to, if it is running.
    pub async fn local_addr(&self, protocol: Protocol) -> Option<SocketAddr> {
        let state = self.state.lock().await;
        state
            .listeners
            .get(&protocol)
            .filter(|listener| listener.is_running())
            .map(|listener| listener.local_addr)
    }

    /// Sends `text` to every WebSocket client, returning how many accepted
    /// it.
    pub async fn broadcast_message(&self, text: &str) -> usize {
        let state = self.state.lock().await;
        let Some(registry) = ws_registry(&state) else {
            return 0;
        };
        let delivered = registry.broadcast(text).await;
        tracing::debug!(delivered, "broadcast queued");
        delivered
    }

    /// Sends `text` to one WebSocket client.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::ClientNotFound`] if no WebSocket client has `id`.
    /// - [`BridgeError::ClientUnavailable`] if the client's queue is closed
    ///   or full.
    pub async fn send_to_client(&self, id: ConnectionId, text: &str) -> Result<(), BridgeError> {
        let state = self.state.lock().await;
        let registry = ws_registry(&state).ok_or(BridgeError::ClientNotFound(id))?;
        registry.send_to(id, text).await
    }

    /// Current configuration.
    pub async fn config(&self) -> ServerConfig {
        self.state.lock().await.config.clone()
    }

    /// Replaces the listener configuration used by the next
    /// [`start_all`](Self::start_all).
    ///
    /// The router, and with it the actor class allowlist, is fixed at
    /// construction.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::AlreadyRunning`] while any listener runs.
    pub async fn reconfigure(&self, config: ServerConfig) -> Result<(), BridgeError> {
        let mut state = self.state.lock().await;
        state.reap_finished();
        if !state.listeners.is_empty() {
            return Err(BridgeError::AlreadyRunning);
        }
        state.config = config;
        Ok(())
    }
}

impl Drop for ServerManager {
    fn drop(&mut self) {
        self.state.get_mut().cancel.cancel();
    }
}

fn ws_registry(state: &ManagerState) -> Option<&Arc<ConnectionRegistry>> {
    state
        .listeners
        .get(&Protocol::Ws)
        .and_then(|listener| listener.registry.as_ref())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::editor::InMemoryEditor;

    fn manager() -> ServerManager {
        let config = ServerConfig::default().with_ports(0, 0, 0);
        ServerManager::with_editor(config, Arc::new(InMemoryEditor::default()))
    }

    #[tokio::test]
    async fn starts_and_stops_all_listeners() {
        let manager = manager();
        assert!(!manager.is_any_running().await);
        assert!(manager.start_all().await);
        assert!(manager.is_any_running().await);

        let status = manager.status().await;
        assert_eq!(status.len(), 3);
        assert!(status.iter().all(|s| s.running && s.local_addr.is_some()));

        manager.stop_all().await;
        assert!(!manager.is_any_running().await);
        assert!(manager.status().await.iter().all(|s| !s.running));
    }

    #[tokio::test]
    async fn stop_all_is_idempotent() {
        let manager = manager();
        manager.stop_all().await;
        assert!(manager.start_all().await);
        manager.stop_all().await;
        manager.stop_all().await;
        assert!(!manager.is_any_running().await);
    }

    #[tokio::test]
    async fn can_restart_after_stop() {
        let manager = manager();
        assert!(manager.start_all().await);
        manager.stop_all().await;
        assert!(manager.start_all().await);
        assert!(manager.local_addr(Protocol::Tcp).await.is_some());
        manager.stop_all().await;
    }

    #[tokio::test]
    async fn start_all_twice_keeps_running_listeners() {
        let manager = manager();
        assert!(manager.start_all().await);
        let before = manager.local_addr(Protocol::Http).await;
        assert!(manager.start_all().await);
        assert_eq!(manager.local_addr(Protocol::Http).await, before);
        manager.stop_all().await;
    }

    #[tokio::test]
    async fn reconfigure_refused_while_running() {
        let manager = manager();
        assert!(manager.start_all().await);
        let result = manager
            .reconfigure(ServerConfig::default().with_max_connections(1))
            .await;
        assert!(matches!(result, Err(BridgeError::AlreadyRunning)));

        manager.stop_all().await;
        let result = manager
            .reconfigure(ServerConfig::default().with_ports(0, 0, 0).with_max_connections(1))
            .await;
        assert!(result.is_ok());
        assert_eq!(manager.config().await.max_connections, 1);
    }

    #[tokio::test]
    async fn send_to_unknown_client_is_not_found() {
        let manager = manager();
        let id = ConnectionId::new();
        let result = manager.send_to_client(id, "hi").await;
        assert!(matches!(result, Err(BridgeError::ClientNotFound(missing)) if missing == id));

        assert!(manager.start_all().await);
        let result = manager.send_to_client(id, "hi").await;
        assert!(matches!(result, Err(BridgeError::ClientNotFound(_))));
        assert_eq!(manager.broadcast_message("nobody").await, 0);
        manager.stop_all().await;
    }
}

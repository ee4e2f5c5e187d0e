//! Binding and spawning of individual listeners.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::api;
use crate::app_state::{AppState, ListenerContext};
use crate::config::ServerConfig;
use crate::domain::{ConnectionRegistry, Protocol};
use crate::error::BridgeError;
use crate::router::CommandRouter;
use crate::{tcp, ws};

/// A listener whose serve loop is running on a background task.
#[derive(Debug)]
pub struct RunningListener {
    /// Listener protocol.
    pub protocol: Protocol,
    /// Address the socket is bound to.
    pub local_addr: SocketAddr,
    /// Live clients; `None` for HTTP.
    pub registry: Option<Arc<ConnectionRegistry>>,
    /// Accept / serve loop.
    pub handle: JoinHandle<()>,
}

impl RunningListener {
    /// Whether the serve loop is still alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Number of connected clients.
    pub async fn active_connections(&self) -> usize {
        match &self.registry {
            Some(registry) => registry.len().await,
            None => 0,
        }
    }
}

/// Binds `protocol`'s socket and spawns its serve loop.
///
/// # Errors
///
/// Returns [`BridgeError::Bind`] if the port cannot be acquired, or
/// [`BridgeError::Io`] if the bound address cannot be read back.
pub async fn start_listener(
    protocol: Protocol,
    config: &ServerConfig,
    router: &Arc<CommandRouter>,
    cancel: &CancellationToken,
    tracker: &TaskTracker,
) -> Result<RunningListener, BridgeError> {
    let addr = match protocol {
        Protocol::Tcp => config.tcp_addr(),
        Protocol::Http => config.http_addr(),
        Protocol::Ws => config.ws_addr(),
    };
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| BridgeError::Bind {
            protocol,
            addr,
            source,
        })?;
    let local_addr = listener.local_addr()?;

    let registry = match protocol {
        Protocol::Http => None,
        Protocol::Tcp | Protocol::Ws => Some(Arc::new(ConnectionRegistry::new(
            protocol,
            config.max_connections,
        ))),
    };

    let handle = match (protocol, &registry) {
        (Protocol::Tcp, Some(registry)) => {
            let ctx = listener_context(config, router, registry, cancel, tracker);
            tokio::spawn(tcp::listener::run_listener(listener, ctx))
        }
        (Protocol::Ws, Some(registry)) => {
            let ctx = listener_context(config, router, registry, cancel, tracker);
            let app = ws::build_router(ctx);
            let shutdown = cancel.clone().cancelled_owned();
            tokio::spawn(async move {
                let service = app.into_make_service_with_connect_info::<SocketAddr>();
                if let Err(err) = axum::serve(listener, service)
                    .with_graceful_shutdown(shutdown)
                    .await
                {
                    tracing::error!(error = %err, "ws listener failed");
                }
            })
        }
        _ => {
            let state = AppState {
                router: Arc::clone(router),
            };
            let app = api::build_router(state, config.request_timeout);
            let shutdown = cancel.clone().cancelled_owned();
            tokio::spawn(async move {
                if let Err(err) = axum::serve(listener, app)
                    .with_graceful_shutdown(shutdown)
                    .await
                {
                    tracing::error!(error = %err, "http listener failed");
                }
            })
        }
    };

    tracing::info!(%protocol, addr = %local_addr, "listener started");
    Ok(RunningListener {
        protocol,
        local_addr,
        registry,
        handle,
    })
}

fn listener_context(
    config: &ServerConfig,
    router: &Arc<CommandRouter>,
    registry: &Arc<ConnectionRegistry>,
    cancel: &CancellationToken,
    tracker: &TaskTracker,
) -> ListenerContext {
    ListenerContext {
        router: Arc::clone(router),
        registry: Arc::clone(registry),
        cancel: cancel.clone(),
        tracker: tracker.clone(),
        idle_timeout: config.idle_timeout,
        outbound_capacity: config.outbound_queue_capacity,
    }
}

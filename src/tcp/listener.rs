//! TCP accept loop.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

use super::connection::serve_client;
use crate::app_state::ListenerContext;
use crate::domain::{ConnectionRecord, Protocol};
use crate::envelope::{ResponseEnvelope, encode_response};
use crate::error::BridgeError;

/// Pause after a failed `accept` (e.g. file descriptor exhaustion).
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// Accepts clients until the context is cancelled.
///
/// Each admitted client is served on its own tracked task. Clients beyond
/// the registry's capacity get one failure line and are closed.
pub async fn run_listener(listener: TcpListener, ctx: ListenerContext) {
    loop {
        let (stream, peer) = tokio::select! {
            biased;
            () = ctx.cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(pair) => pair,
                Err(err) => {
                    tracing::warn!(error = %err, "tcp accept failed");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            },
        };

        let record = ConnectionRecord::new(Protocol::Tcp, peer, None);
        match ctx.registry.try_register(record).await {
            Ok(id) => {
                tracing::info!(client = %id, %peer, "tcp client connected");
                ctx.tracker.spawn(serve_client(stream, id, ctx.clone()));
            }
            Err(err) => {
                tracing::warn!(%peer, code = err.error_code(), "tcp client refused: {err}");
                ctx.tracker.spawn(refuse(stream, err));
            }
        }
    }

    tracing::info!("tcp listener stopped accepting");
}

/// Tells a refused client why and closes the socket.
async fn refuse(mut stream: TcpStream, err: BridgeError) {
    let mut line = encode_response(&ResponseEnvelope::failure(&err));
    line.push('\n');
    if let Err(io_err) = stream.write_all(line.as_bytes()).await {
        tracing::debug!(error = %io_err, "failed to notify refused tcp client");
    }
    let _ = stream.shutdown().await;
}

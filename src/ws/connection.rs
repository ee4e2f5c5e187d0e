//! WebSocket connection loop.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding server-initiated messages
//! queued through the registry.

use std::net::SocketAddr;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::app_state::ListenerContext;
use crate::domain::{ConnectionRecord, Protocol};
use crate::envelope::{ResponseEnvelope, encode_response};

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads command envelopes from the client and answers each in order.
/// - Forwards messages queued by `send_to_client` / `broadcast_message`.
/// - Sends a close frame when the listener stops or the client has sent
///   nothing for the idle timeout.
pub async fn run_connection(socket: WebSocket, peer: SocketAddr, ctx: ListenerContext) {
    if ctx.cancel.is_cancelled() {
        return;
    }

    let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(ctx.outbound_capacity);
    let (mut ws_tx, mut ws_rx) = socket.split();

    let record = ConnectionRecord::new(Protocol::Ws, peer, Some(outbound_tx));
    let id = match ctx.registry.try_register(record).await {
        Ok(id) => id,
        Err(err) => {
            let refusal = encode_response(&ResponseEnvelope::failure(&err));
            let _ = ws_tx.send(Message::text(refusal)).await;
            let _ = ws_tx.send(Message::Close(None)).await;
            return;
        }
    };
    tracing::info!(client = %id, %peer, "ws client connected");

    // Only inbound frames count as activity; server-initiated messages do
    // not keep a silent client alive.
    let idle = tokio::time::sleep(ctx.idle_timeout);
    tokio::pin!(idle);

    loop {
        tokio::select! {
            biased;
            () = ctx.cancel.cancelled() => {
                let _ = ws_tx.send(Message::Close(None)).await;
                break;
            }
            // Message queued by the server for this client
            outbound = outbound_rx.recv() => {
                let Some(text) = outbound else { break };
                if ws_tx.send(Message::text(text)).await.is_err() {
                    break;
                }
            }
            // Incoming message from client
            inbound = ws_rx.next() => {
                idle.as_mut().reset(Instant::now() + ctx.idle_timeout);
                let payload = match inbound {
                    Some(Ok(Message::Text(text))) => text.as_str().as_bytes().to_vec(),
                    Some(Ok(Message::Binary(bytes))) => bytes.to_vec(),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => {
                        tracing::debug!(client = %id, error = %err, "ws read failed; closing");
                        break;
                    }
                };

                ctx.registry.touch(id).await;
                let response = ctx.router.handle_bytes(&payload);
                if ws_tx.send(Message::text(encode_response(&response))).await.is_err() {
                    break;
                }
            }
            () = &mut idle => {
                tracing::debug!(client = %id, "ws client idle; closing");
                let _ = ws_tx.send(Message::Close(None)).await;
                break;
            }
        }
    }

    ctx.registry.unregister(id).await;
    tracing::info!(client = %id, "ws connection closed");
}

//! Per-client TCP read/dispatch/write loop.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use super::MAX_LINE_LENGTH;
use super::codec::{LineFrame, RequestLineCodec};
use crate::app_state::ListenerContext;
use crate::domain::ConnectionId;
use crate::envelope::{ResponseEnvelope, encode_response};
use crate::error::{BridgeError, DecodeError};

/// Serves one client until it disconnects, idles out, or the listener is
/// stopped.
///
/// Requests are answered strictly in arrival order. Malformed lines
/// (invalid JSON or UTF-8, over-long) get a failure envelope and the
/// connection stays open. The client is removed from the registry on every
/// exit path.
pub async fn serve_client(stream: TcpStream, id: ConnectionId, ctx: ListenerContext) {
    let mut framed = Framed::new(stream, RequestLineCodec::new(MAX_LINE_LENGTH));

    loop {
        let next = tokio::select! {
            biased;
            () = ctx.cancel.cancelled() => break,
            next = tokio::time::timeout(ctx.idle_timeout, framed.next()) => next,
        };

        let frame = match next {
            Err(_) => {
                tracing::debug!(client = %id, "tcp client idle; closing");
                break;
            }
            Ok(None) => break,
            Ok(Some(Err(err))) => {
                tracing::warn!(client = %id, error = %err, "tcp read failed; closing");
                break;
            }
            Ok(Some(Ok(frame))) => frame,
        };

        let response = match frame {
            LineFrame::Line(line) if line.trim_ascii().is_empty() => continue,
            LineFrame::Line(line) => {
                ctx.registry.touch(id).await;
                ctx.router.handle_bytes(&line)
            }
            LineFrame::Oversized => {
                tracing::warn!(client = %id, limit = MAX_LINE_LENGTH, "tcp request line too long");
                ctx.registry.touch(id).await;
                let err = BridgeError::from(DecodeError::TooLarge {
                    limit: MAX_LINE_LENGTH,
                });
                ResponseEnvelope::failure(&err)
            }
        };

        if let Err(err) = framed.send(encode_response(&response)).await {
            tracing::debug!(client = %id, error = %err, "tcp write failed; closing");
            break;
        }
    }

    ctx.registry.unregister(id).await;
    tracing::info!(client = %id, "tcp client disconnected");
}

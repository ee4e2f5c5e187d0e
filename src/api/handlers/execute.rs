//! Command execution endpoint.

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::routing::post;

use crate::app_state::AppState;
use crate::envelope::ResponseEnvelope;
use crate::error::{BridgeError, DecodeError};

/// Largest accepted request body, in bytes. Matches the TCP line limit.
pub const MAX_BODY_BYTES: usize = crate::tcp::MAX_LINE_LENGTH;

/// `POST /api/execute` — Run one command envelope.
///
/// The body is decoded by the envelope codec rather than Axum's `Json`
/// extractor so malformed bodies still produce a `200` failure envelope.
/// Bodies over [`MAX_BODY_BYTES`] are answered with `Request too large`.
pub async fn execute_command(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> ResponseEnvelope {
    match body {
        Ok(body) => state.router.handle_bytes(&body),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            let err = BridgeError::from(DecodeError::TooLarge {
                limit: MAX_BODY_BYTES,
            });
            tracing::warn!(code = err.error_code(), limit = MAX_BODY_BYTES, "request body too large");
            ResponseEnvelope::failure(&err)
        }
        Err(rejection) => {
            tracing::warn!(status = %rejection.status(), "failed to read request body: {rejection}");
            ResponseEnvelope::failure_message(rejection.body_text())
        }
    }
}

/// Command routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/execute", post(execute_command))
}

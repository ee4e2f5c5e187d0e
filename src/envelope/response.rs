//! Outbound response envelope.

use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BridgeError;

/// Uniform result of every request on every transport.
///
/// `success == false` always carries `error`; `success == true` carries
/// `data` only for operations that return something.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Operation result, omitted for void operations and failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Human-readable failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseEnvelope {
    /// Successful response carrying `data`.
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Successful response without data.
    #[must_use]
    pub fn ok_empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    /// Failed response with the error's display text.
    #[must_use]
    pub fn failure(error: &BridgeError) -> Self {
        Self::failure_message(error.to_string())
    }

    /// Failed response with an arbitrary message.
    #[must_use]
    pub fn failure_message(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl From<Result<Option<Value>, BridgeError>> for ResponseEnvelope {
    fn from(result: Result<Option<Value>, BridgeError>) -> Self {
        match result {
            Ok(Some(data)) => Self::ok(data),
            Ok(None) => Self::ok_empty(),
            Err(err) => Self::failure(&err),
        }
    }
}

/// HTTP rendering: always `200 OK` with a permissive CORS origin. Failures
/// live inside the envelope, not in the status line.
impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        (
            [
                (header::CONTENT_TYPE, "application/json"),
                (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            ],
            super::encode_response(&self),
        )
            .into_response()
    }
}

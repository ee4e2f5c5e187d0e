//! Bridge error types with response envelope mapping.
//!
//! [`BridgeError`] is the central error type. Request- and command-level
//! variants render into a `success=false` response envelope whose `error`
//! string is the variant's `Display` text; server-level variants are
//! reported to the caller of the listener manager.

use std::net::SocketAddr;

use axum::response::{IntoResponse, Response};

use crate::domain::{ConnectionId, Protocol};
use crate::envelope::ResponseEnvelope;

/// Failure to turn an inbound payload into a command envelope.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The payload is not valid JSON.
    #[error("Invalid JSON")]
    MalformedJson(#[source] serde_json::Error),

    /// A required envelope field is absent, empty, or not a string.
    #[error("Missing {0} field")]
    MissingField(&'static str),

    /// The payload exceeds the transport's size limit.
    #[error("Request too large")]
    TooLarge {
        /// Largest accepted payload, in bytes.
        limit: usize,
    },
}

/// Bridge-wide error enum.
///
/// # Error Code Ranges
///
/// | Range     | Category  | Surfaces as                          |
/// |-----------|-----------|--------------------------------------|
/// | 1000–1999 | Request   | failure envelope                     |
/// | 2000–2999 | Command   | failure envelope                     |
/// | 3000–3999 | Editor    | failure envelope                     |
/// | 4000–4999 | Server    | returned from the listener manager   |
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The command envelope could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A handler-required parameter is missing or has the wrong type.
    #[error("Missing {0}")]
    MissingParam(&'static str),

    /// No handler is registered under the given command name.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// The command is registered but has no implementation.
    #[error("Not implemented yet")]
    NotImplemented,

    /// The editor collaborator is not running or has no active session.
    #[error("Editor unavailable")]
    EditorUnavailable,

    /// The requested actor class did not resolve or the spawn was refused.
    #[error("Failed to create actor")]
    SpawnFailed,

    /// The editor reported failure for a forwarded operation.
    #[error("{0} failed")]
    OperationFailed(&'static str),

    /// A listener could not acquire its port.
    #[error("failed to bind {protocol} listener on {addr}: {source}")]
    Bind {
        /// Listener protocol.
        protocol: Protocol,
        /// Address the bind was attempted on.
        addr: SocketAddr,
        /// Underlying socket error.
        #[source]
        source: std::io::Error,
    },

    /// The listener is already serving `max_connections` clients.
    #[error("Connection limit reached")]
    AtCapacity,

    /// Configuration changes are rejected while listeners run.
    #[error("servers are running; stop them before reconfiguring")]
    AlreadyRunning,

    /// No connected client has the given identifier.
    #[error("unknown client: {0}")]
    ClientNotFound(ConnectionId),

    /// The client's outbound queue is closed or full.
    #[error("client {0} is not accepting messages")]
    ClientUnavailable(ConnectionId),

    /// Socket-level failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Decode(DecodeError::MalformedJson(_)) => 1001,
            Self::Decode(DecodeError::MissingField(_)) => 1002,
            Self::Decode(DecodeError::TooLarge { .. }) => 1003,
            Self::MissingParam(_) => 2001,
            Self::UnknownCommand(_) => 2002,
            Self::NotImplemented => 2003,
            Self::EditorUnavailable => 3001,
            Self::SpawnFailed => 3002,
            Self::OperationFailed(_) => 3003,
            Self::Bind { .. } => 4001,
            Self::AtCapacity => 4002,
            Self::AlreadyRunning => 4003,
            Self::ClientNotFound(_) => 4004,
            Self::ClientUnavailable(_) => 4005,
            Self::Io(_) => 4000,
        }
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        ResponseEnvelope::failure(&self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_wire_messages() {
        assert_eq!(
            BridgeError::UnknownCommand("Foo".to_string()).to_string(),
            "Unknown command: Foo"
        );
        assert_eq!(
            BridgeError::MissingParam("className").to_string(),
            "Missing className"
        );
        assert_eq!(BridgeError::NotImplemented.to_string(), "Not implemented yet");
        assert_eq!(BridgeError::SpawnFailed.to_string(), "Failed to create actor");
        assert_eq!(
            BridgeError::OperationFailed("Save").to_string(),
            "Save failed"
        );
    }

    #[test]
    fn decode_errors_are_transparent() {
        let err = BridgeError::from(DecodeError::MissingField("command"));
        assert_eq!(err.to_string(), "Missing command field");
        assert_eq!(err.error_code(), 1002);

        let err = BridgeError::from(DecodeError::TooLarge { limit: 16 });
        assert_eq!(err.to_string(), "Request too large");
        assert_eq!(err.error_code(), 1003);
    }

    #[test]
    fn codes_group_by_category() {
        assert!((2000..3000).contains(&BridgeError::NotImplemented.error_code()));
        assert!((3000..4000).contains(&BridgeError::EditorUnavailable.error_code()));
        assert!((4000..5000).contains(&BridgeError::AlreadyRunning.error_code()));
    }
}

//! Inbound command envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A request naming an operation and its parameters.
///
/// `command` is guaranteed non-empty when produced by
/// [`super::decode_command`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    /// Operation name, matched case-sensitively against the router table.
    pub command: String,
    /// Operation parameters. Absent when the payload had no `params`
    /// object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
}

impl CommandEnvelope {
    /// Creates an envelope without parameters.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            params: None,
        }
    }

    /// Creates an envelope with a parameter object.
    #[must_use]
    pub fn with_params(command: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            command: command.into(),
            params: Some(params),
        }
    }
}

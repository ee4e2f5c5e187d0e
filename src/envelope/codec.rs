//! JSON codec for command and response envelopes.
//!
//! Decoding goes through [`serde_json::Value`] rather than deriving straight
//! into [`CommandEnvelope`] so that a missing `command` and invalid JSON stay
//! distinguishable, and so a non-object `params` is ignored instead of
//! rejecting the whole request.

use serde_json::Value;

use super::{CommandEnvelope, ResponseEnvelope};
use crate::error::DecodeError;

/// Encoded form used if serialization ever fails.
const ENCODE_FALLBACK: &str = r#"{"success":false,"error":"Internal encoding error"}"#;

/// Decodes a raw payload into a [`CommandEnvelope`].
///
/// # Errors
///
/// - [`DecodeError::MalformedJson`] if `bytes` is not valid JSON.
/// - [`DecodeError::MissingField`] if the payload is not an object or its
///   `command` key is absent, not a string, or empty.
pub fn decode_command(bytes: &[u8]) -> Result<CommandEnvelope, DecodeError> {
    let value: Value = serde_json::from_slice(bytes).map_err(DecodeError::MalformedJson)?;

    let Value::Object(mut object) = value else {
        return Err(DecodeError::MissingField("command"));
    };

    let command = match object.remove("command") {
        Some(Value::String(command)) if !command.is_empty() => command,
        _ => return Err(DecodeError::MissingField("command")),
    };

    let params = match object.remove("params") {
        Some(Value::Object(params)) => Some(params),
        _ => None,
    };

    Ok(CommandEnvelope { command, params })
}

/// Encodes a [`ResponseEnvelope`] as compact JSON text.
///
/// Absent `data` / `error` keys are omitted. Never fails.
#[must_use]
pub fn encode_response(response: &ResponseEnvelope) -> String {
    serde_json::to_string(response).unwrap_or_else(|err| {
        tracing::error!(error = %err, "failed to encode response envelope");
        ENCODE_FALLBACK.to_string()
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_command_with_params() {
        let Ok(env) = decode_command(br#"{"command":"CreateActor","params":{"className":"PointLight"}}"#)
        else {
            panic!("expected a valid envelope");
        };
        assert_eq!(env.command, "CreateActor");
        let Some(params) = env.params else {
            panic!("expected params");
        };
        assert_eq!(params.get("className"), Some(&json!("PointLight")));
    }

    #[test]
    fn params_are_optional() {
        let Ok(env) = decode_command(br#"{"command":"SaveAll"}"#) else {
            panic!("expected a valid envelope");
        };
        assert!(env.params.is_none());
    }

    #[test]
    fn non_object_params_are_ignored() {
        let Ok(env) = decode_command(br#"{"command":"GetActors","params":[1,2]}"#) else {
            panic!("expected a valid envelope");
        };
        assert!(env.params.is_none());
    }

    #[test]
    fn invalid_json_is_malformed() {
        let result = decode_command(b"{not json");
        assert!(matches!(result, Err(DecodeError::MalformedJson(_))));
    }

    #[test]
    fn missing_or_bad_command_is_missing_field() {
        for payload in [
            &br#"{"params":{}}"#[..],
            br#"{"command":42}"#,
            br#"{"command":""}"#,
            br#"["command"]"#,
        ] {
            let result = decode_command(payload);
            assert!(
                matches!(result, Err(DecodeError::MissingField("command"))),
                "payload {:?}",
                String::from_utf8_lossy(payload)
            );
        }
    }

    #[test]
    fn encode_omits_absent_keys() {
        assert_eq!(
            encode_response(&ResponseEnvelope::ok_empty()),
            r#"{"success":true}"#
        );
        assert_eq!(
            encode_response(&ResponseEnvelope::failure_message("Unknown command: Foo")),
            r#"{"success":false,"error":"Unknown command: Foo"}"#
        );
    }

    #[test]
    fn response_survives_json_round_trip() {
        let original = ResponseEnvelope::ok(json!({"actors": [{"name": "A", "location": {"x": 1.5}}]}));
        let text = encode_response(&original);
        let Ok(decoded) = serde_json::from_str::<ResponseEnvelope>(&text) else {
            panic!("response did not decode");
        };
        assert_eq!(decoded, original);
    }
}

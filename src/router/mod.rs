//! Command router: maps command names to operation handlers.
//!
//! The table is built once in [`CommandRouter::new`] and never changes, so a
//! single router is shared by every listener and connection through an
//! `Arc` without locking.

pub mod actor_class;
pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;

pub use actor_class::ActorClassTable;
use handlers::{Handler, HandlerContext};

use crate::editor::EditorControl;
use crate::envelope::{CommandEnvelope, ResponseEnvelope, decode_command};
use crate::error::BridgeError;

/// The closed set of commands the bridge understands.
const COMMANDS: &[(&str, Handler)] = &[
    ("GetProjectInfo", handlers::get_project_info),
    ("CreateActor", handlers::create_actor),
    ("GetActors", handlers::get_actors),
    ("ConsoleCommand", handlers::console_command),
    ("SaveAll", handlers::save_all),
    ("BuildLighting", handlers::build_lighting),
    ("ModifyActor", handlers::not_implemented),
    ("DeleteActor", handlers::not_implemented),
    ("CreateBlueprint", handlers::not_implemented),
    ("Ping", handlers::ping),
];

/// Resolves command envelopes to handlers and wraps their results.
pub struct CommandRouter {
    editor: Arc<dyn EditorControl>,
    actor_classes: ActorClassTable,
    handlers: HashMap<&'static str, Handler>,
}

impl std::fmt::Debug for CommandRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRouter")
            .field("editor", &self.editor)
            .field("actor_classes", &self.actor_classes)
            .field("commands", &self.command_names())
            .finish()
    }
}

impl CommandRouter {
    /// Creates a router over `editor` with the given actor class table.
    #[must_use]
    pub fn new(editor: Arc<dyn EditorControl>, actor_classes: ActorClassTable) -> Self {
        Self {
            editor,
            actor_classes,
            handlers: COMMANDS.iter().copied().collect(),
        }
    }

    /// Registered command names, sorted.
    #[must_use]
    pub fn command_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Runs the handler registered for `envelope.command`.
    ///
    /// Unknown names yield `Unknown command: <name>`; handler errors become
    /// failure envelopes. Never panics and never fails the caller.
    #[must_use]
    pub fn dispatch(&self, envelope: &CommandEnvelope) -> ResponseEnvelope {
        let Some(handler) = self.handlers.get(envelope.command.as_str()) else {
            let err = BridgeError::UnknownCommand(envelope.command.clone());
            tracing::debug!(command = %envelope.command, code = err.error_code(), "unknown command");
            return ResponseEnvelope::failure(&err);
        };

        let ctx = HandlerContext {
            editor: self.editor.as_ref(),
            actor_classes: &self.actor_classes,
        };

        let result = handler(&ctx, envelope.params.as_ref());
        if let Err(err) = &result {
            tracing::debug!(
                command = %envelope.command,
                code = err.error_code(),
                error = %err,
                "command failed"
            );
        }
        ResponseEnvelope::from(result)
    }

    /// Decodes a raw payload and dispatches it.
    ///
    /// Decode failures are answered here and never reach a handler.
    #[must_use]
    pub fn handle_bytes(&self, payload: &[u8]) -> ResponseEnvelope {
        match decode_command(payload) {
            Ok(envelope) => self.dispatch(&envelope),
            Err(err) => {
                let err = BridgeError::from(err);
                tracing::debug!(code = err.error_code(), error = %err, "rejected payload");
                ResponseEnvelope::failure(&err)
            }
        }
    }
}

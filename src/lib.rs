//! # editor-bridge
//!
//! Command bridge that lets an external controller drive a running 3D
//! content editor over local TCP, HTTP and WebSocket endpoints.
//!
//! Every transport carries the same JSON command envelope
//! (`{"command": "...", "params": {...}}`) and answers with the same
//! response envelope (`{"success": bool, "data"?: ..., "error"?: "..."}`).
//! The editor itself is an external collaborator reached through the
//! [`editor::EditorControl`] trait; this crate only routes to it.
//!
//! ## Architecture
//!
//! ```text
//! Clients (TCP lines, HTTP POST, WebSocket frames)
//!     │
//!     ├── TCP listener (tcp/)
//!     ├── HTTP router (api/)
//!     ├── WS handler (ws/)
//!     │
//!     ├── ServerManager + ConnectionRegistry (server/, domain/)
//!     │
//!     ├── Envelope codec (envelope/)
//!     ├── CommandRouter + handlers (router/)
//!     │
//!     └── EditorControl (editor/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod editor;
pub mod envelope;
pub mod error;
pub mod router;
pub mod server;
pub mod tcp;
pub mod ws;

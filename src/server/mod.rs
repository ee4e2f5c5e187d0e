//! Connection/listener manager.
//!
//! [`ServerManager`] owns the TCP, HTTP and WebSocket listeners, their
//! connection registries and the cancellation machinery that stops them.

pub mod listener;
pub mod manager;

pub use manager::ServerManager;

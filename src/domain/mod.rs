//! Domain layer: connection identity, the per-listener connection
//! registry, and listener status types.

pub mod connection_id;
pub mod connection_registry;
pub mod server_status;

pub use connection_id::ConnectionId;
pub use connection_registry::{ConnectionRecord, ConnectionRegistry, ConnectionSummary};
pub use server_status::{Protocol, ServerStatus};

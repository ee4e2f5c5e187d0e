//! Per-listener registry of connected clients.
//!
//! [`ConnectionRegistry`] owns one [`ConnectionRecord`] per live TCP or
//! WebSocket client. Capacity checks and registration happen under a single
//! write lock, so the `max_connections` bound holds under concurrent
//! accepts.

use std::collections::HashMap;
use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::sync::mpsc::{self, error::TrySendError};

use super::{ConnectionId, Protocol};
use crate::error::BridgeError;

/// Live state for one connected client.
#[derive(Debug)]
pub struct ConnectionRecord {
    /// Client identifier.
    pub id: ConnectionId,
    /// Transport the client is connected over.
    pub protocol: Protocol,
    /// Remote address.
    pub peer: SocketAddr,
    /// Accept time.
    pub connected_at: DateTime<Utc>,
    /// Time of the most recent inbound message.
    pub last_activity: DateTime<Utc>,
    /// Queue feeding the client's writer, for server-initiated messages.
    outbound: Option<mpsc::Sender<String>>,
}

impl ConnectionRecord {
    /// Creates a record for a freshly accepted client.
    #[must_use]
    pub fn new(protocol: Protocol, peer: SocketAddr, outbound: Option<mpsc::Sender<String>>) -> Self {
        let now = Utc::now();
        Self {
            id: ConnectionId::new(),
            protocol,
            peer,
            connected_at: now,
            last_activity: now,
            outbound,
        }
    }

    fn push(&self, text: &str) -> Result<(), BridgeError> {
        let Some(outbound) = &self.outbound else {
            return Err(BridgeError::ClientUnavailable(self.id));
        };
        outbound.try_send(text.to_string()).map_err(|err| {
            if matches!(err, TrySendError::Full(_)) {
                tracing::warn!(client = %self.id, "outbound queue full; message dropped");
            }
            BridgeError::ClientUnavailable(self.id)
        })
    }
}

/// Lightweight view of a record for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionSummary {
    /// Client identifier.
    pub id: ConnectionId,
    /// Transport.
    pub protocol: Protocol,
    /// Remote address.
    pub peer: SocketAddr,
    /// Accept time.
    pub connected_at: DateTime<Utc>,
    /// Most recent inbound message.
    pub last_activity: DateTime<Utc>,
}

impl From<&ConnectionRecord> for ConnectionSummary {
    fn from(record: &ConnectionRecord) -> Self {
        Self {
            id: record.id,
            protocol: record.protocol,
            peer: record.peer,
            connected_at: record.connected_at,
            last_activity: record.last_activity,
        }
    }
}

/// Bounded set of live clients for one listener.
#[derive(Debug)]
pub struct ConnectionRegistry {
    protocol: Protocol,
    max_connections: usize,
    connections: RwLock<HashMap<ConnectionId, ConnectionRecord>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry admitting at most `max_connections`
    /// clients.
    #[must_use]
    pub fn new(protocol: Protocol, max_connections: usize) -> Self {
        Self {
            protocol,
            max_connections,
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Protocol of the owning listener.
    #[must_use]
    pub const fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Admits a client if the registry is below capacity.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::AtCapacity`] when `max_connections` clients
    /// are already registered.
    pub async fn try_register(&self, record: ConnectionRecord) -> Result<ConnectionId, BridgeError> {
        let mut map = self.connections.write().await;
        if map.len() >= self.max_connections {
            return Err(BridgeError::AtCapacity);
        }
        let id = record.id;
        map.insert(id, record);
        Ok(id)
    }

    /// Whether another client would currently be admitted.
    pub async fn has_capacity(&self) -> bool {
        self.connections.read().await.len() < self.max_connections
    }

    /// Removes a client, returning its record.
    pub async fn unregister(&self, id: ConnectionId) -> Option<ConnectionRecord> {
        self.connections.write().await.remove(&id)
    }

    /// Marks inbound activity on a client.
    pub async fn touch(&self, id: ConnectionId) {
        if let Some(record) = self.connections.write().await.get_mut(&id) {
            record.last_activity = Utc::now();
        }
    }

    /// Queues `text` for one client.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::ClientNotFound`] if `id` is not registered.
    /// - [`BridgeError::ClientUnavailable`] if the client has no outbound
    ///   queue or the queue is closed or full.
    pub async fn send_to(&self, id: ConnectionId, text: &str) -> Result<(), BridgeError> {
        let map = self.connections.read().await;
        let record = map.get(&id).ok_or(BridgeError::ClientNotFound(id))?;
        record.push(text)
    }

    /// Queues `text` for every client, returning how many accepted it.
    pub async fn broadcast(&self, text: &str) -> usize {
        let map = self.connections.read().await;
        map.values().filter(|record| record.push(text).is_ok()).count()
    }

    /// Summaries of all live clients.
    pub async fn list(&self) -> Vec<ConnectionSummary> {
        let map = self.connections.read().await;
        map.values().map(ConnectionSummary::from).collect()
    }

    /// Number of live clients.
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Returns `true` if no client is connected.
    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn peer() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 40000))
    }

    #[tokio::test]
    async fn register_until_capacity() {
        let registry = ConnectionRegistry::new(Protocol::Tcp, 2);
        assert!(registry.has_capacity().await);
        assert!(registry.try_register(ConnectionRecord::new(Protocol::Tcp, peer(), None)).await.is_ok());
        assert!(registry.try_register(ConnectionRecord::new(Protocol::Tcp, peer(), None)).await.is_ok());
        assert!(!registry.has_capacity().await);

        let third = registry
            .try_register(ConnectionRecord::new(Protocol::Tcp, peer(), None))
            .await;
        assert!(matches!(third, Err(BridgeError::AtCapacity)));
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn unregister_frees_a_slot() {
        let registry = ConnectionRegistry::new(Protocol::Ws, 1);
        let Ok(id) = registry
            .try_register(ConnectionRecord::new(Protocol::Ws, peer(), None))
            .await
        else {
            panic!("first client must be admitted");
        };
        assert!(registry.unregister(id).await.is_some());
        assert!(registry.is_empty().await);
        assert!(registry.has_capacity().await);
    }

    #[tokio::test]
    async fn send_to_reaches_only_the_target() {
        let registry = ConnectionRegistry::new(Protocol::Ws, 4);
        let (tx_a, mut rx_a) = mpsc::channel(4);
        let (tx_b, mut rx_b) = mpsc::channel(4);
        let Ok(a) = registry
            .try_register(ConnectionRecord::new(Protocol::Ws, peer(), Some(tx_a)))
            .await
        else {
            panic!("register a");
        };
        let _ = registry
            .try_register(ConnectionRecord::new(Protocol::Ws, peer(), Some(tx_b)))
            .await;

        assert!(registry.send_to(a, "hello").await.is_ok());
        assert_eq!(rx_a.recv().await.as_deref(), Some("hello"));
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn send_to_unknown_client_fails() {
        let registry = ConnectionRegistry::new(Protocol::Ws, 4);
        let missing = ConnectionId::new();
        let result = registry.send_to(missing, "x").await;
        assert!(matches!(result, Err(BridgeError::ClientNotFound(id)) if id == missing));
    }

    #[tokio::test]
    async fn broadcast_counts_live_receivers() {
        let registry = ConnectionRegistry::new(Protocol::Ws, 4);
        let (tx_a, mut rx_a) = mpsc::channel(4);
        let (tx_b, rx_b) = mpsc::channel(4);
        let _ = registry
            .try_register(ConnectionRecord::new(Protocol::Ws, peer(), Some(tx_a)))
            .await;
        let _ = registry
            .try_register(ConnectionRecord::new(Protocol::Ws, peer(), Some(tx_b)))
            .await;
        drop(rx_b);

        assert_eq!(registry.broadcast("tick").await, 1);
        assert_eq!(rx_a.recv().await.as_deref(), Some("tick"));
    }

    #[tokio::test]
    async fn touch_advances_last_activity() {
        let registry = ConnectionRegistry::new(Protocol::Tcp, 1);
        let record = ConnectionRecord::new(Protocol::Tcp, peer(), None);
        let connected_at = record.connected_at;
        let Ok(id) = registry.try_register(record).await else {
            panic!("register");
        };
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        registry.touch(id).await;
        let list = registry.list().await;
        let Some(summary) = list.first() else {
            panic!("one client expected");
        };
        assert!(summary.last_activity > connected_at);
    }
}

//! Listener protocols and the status snapshot reported per listener.

use std::fmt;
use std::net::SocketAddr;

use serde::Serialize;

/// Transport a listener speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    /// Raw TCP, newline-delimited JSON.
    Tcp,
    /// HTTP, `POST /api/execute`.
    Http,
    /// WebSocket text frames.
    Ws,
}

impl Protocol {
    /// All protocols in startup order.
    pub const ALL: [Self; 3] = [Self::Tcp, Self::Http, Self::Ws];
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tcp => "TCP",
            Self::Http => "HTTP",
            Self::Ws => "WS",
        })
    }
}

/// Read-only snapshot of one listener, computed on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerStatus {
    /// Listener protocol.
    pub protocol: Protocol,
    /// Whether the listener is accepting.
    pub running: bool,
    /// Connected clients. Always 0 for HTTP, which has no persistent
    /// clients.
    pub active_connections: usize,
    /// Bound address while running.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_addr: Option<SocketAddr>,
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.running { "running" } else { "stopped" };
        match self.local_addr {
            Some(addr) => write!(
                f,
                "{} {state} on {addr} ({} connections)",
                self.protocol, self.active_connections
            ),
            None => write!(f, "{} {state}", self.protocol),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Protocol::Ws).ok().as_deref(), Some("\"WS\""));
        assert_eq!(Protocol::Tcp.to_string(), "TCP");
    }

    #[test]
    fn status_line_mentions_address_when_running() {
        let status = ServerStatus {
            protocol: Protocol::Tcp,
            running: true,
            active_connections: 2,
            local_addr: "127.0.0.1:55557".parse().ok(),
        };
        assert_eq!(status.to_string(), "TCP running on 127.0.0.1:55557 (2 connections)");
    }
}

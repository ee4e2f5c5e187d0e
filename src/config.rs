//! Bridge configuration loaded from environment variables.
//!
//! All settings come from environment variables (or a `.env` file via
//! `dotenvy`). Every key is optional; unset or unparsable values fall back
//! to the defaults below.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Default raw TCP port.
pub const DEFAULT_TCP_PORT: u16 = 55557;
/// Default HTTP port.
pub const DEFAULT_HTTP_PORT: u16 = 30010;
/// Default WebSocket port.
pub const DEFAULT_WS_PORT: u16 = 30011;
/// Default per-listener client cap.
pub const DEFAULT_MAX_CONNECTIONS: usize = 10;

/// Engine class names `CreateActor` may spawn by name when no alias matches.
pub const DEFAULT_ACTOR_CLASSES: &[&str] = &[
    "StaticMeshActor",
    "PointLight",
    "DirectionalLight",
    "SpotLight",
    "SkyLight",
    "RectLight",
    "CameraActor",
    "PlayerStart",
    "TextRenderActor",
];

/// Top-level bridge configuration.
///
/// Loaded once at startup via [`ServerConfig::from_env`], or built in code
/// from [`ServerConfig::default`] and the `with_*` methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface all listeners bind to.
    pub bind_host: IpAddr,

    /// Raw TCP listener port (newline-delimited JSON).
    pub tcp_port: u16,

    /// HTTP listener port (`POST /api/execute`).
    pub http_port: u16,

    /// WebSocket listener port.
    pub ws_port: u16,

    /// Maximum concurrent clients per TCP / WebSocket listener.
    pub max_connections: usize,

    /// Upper bound for a single HTTP request.
    pub request_timeout: Duration,

    /// TCP / WebSocket clients silent for this long are disconnected.
    pub idle_timeout: Duration,

    /// Capacity of each WebSocket client's outbound queue.
    pub outbound_queue_capacity: usize,

    /// Closed set of engine class names `CreateActor` accepts verbatim.
    pub actor_classes: Vec<String>,

    /// Project name reported by the headless editor.
    pub project_name: String,

    /// Engine version reported by the headless editor.
    pub engine_version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            tcp_port: DEFAULT_TCP_PORT,
            http_port: DEFAULT_HTTP_PORT,
            ws_port: DEFAULT_WS_PORT,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            request_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(300),
            outbound_queue_capacity: 64,
            actor_classes: DEFAULT_ACTOR_CLASSES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            project_name: "HeadlessProject".to_string(),
            engine_version: "5.4.0".to_string(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `BRIDGE_BIND_HOST` is set but cannot be parsed
    /// as an [`IpAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let bind_host: IpAddr = match std::env::var("BRIDGE_BIND_HOST") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.bind_host,
        };

        let actor_classes = std::env::var("BRIDGE_ACTOR_CLASSES")
            .ok()
            .map(|raw| parse_list(&raw))
            .filter(|list| !list.is_empty())
            .unwrap_or(defaults.actor_classes);

        Ok(Self {
            bind_host,
            tcp_port: parse_env("BRIDGE_TCP_PORT", defaults.tcp_port),
            http_port: parse_env("BRIDGE_HTTP_PORT", defaults.http_port),
            ws_port: parse_env("BRIDGE_WS_PORT", defaults.ws_port),
            max_connections: parse_env("BRIDGE_MAX_CONNECTIONS", defaults.max_connections),
            request_timeout: Duration::from_secs(parse_env("BRIDGE_REQUEST_TIMEOUT_SECS", 30)),
            idle_timeout: Duration::from_secs(parse_env("BRIDGE_IDLE_TIMEOUT_SECS", 300)),
            outbound_queue_capacity: parse_env(
                "BRIDGE_OUTBOUND_QUEUE_CAPACITY",
                defaults.outbound_queue_capacity,
            )
            .max(1),
            actor_classes,
            project_name: std::env::var("BRIDGE_PROJECT_NAME").unwrap_or(defaults.project_name),
            engine_version: std::env::var("BRIDGE_ENGINE_VERSION")
                .unwrap_or(defaults.engine_version),
        })
    }

    /// Sets the three listener ports.
    #[must_use]
    pub fn with_ports(mut self, tcp_port: u16, http_port: u16, ws_port: u16) -> Self {
        self.tcp_port = tcp_port;
        self.http_port = http_port;
        self.ws_port = ws_port;
        self
    }

    /// Sets the per-listener client cap.
    #[must_use]
    pub fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Sets the interface all listeners bind to.
    #[must_use]
    pub fn with_bind_host(mut self, bind_host: IpAddr) -> Self {
        self.bind_host = bind_host;
        self
    }

    /// Sets the idle timeout for TCP and WebSocket clients.
    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Sets the actor classes `CreateActor` may spawn.
    #[must_use]
    pub fn with_actor_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actor_classes = classes.into_iter().map(Into::into).collect();
        self
    }

    /// Socket address for the TCP listener.
    #[must_use]
    pub fn tcp_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_host, self.tcp_port)
    }

    /// Socket address for the HTTP listener.
    #[must_use]
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_host, self.http_port)
    }

    /// Socket address for the WebSocket listener.
    #[must_use]
    pub fn ws_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_host, self.ws_port)
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Splits a comma-separated list, dropping blanks.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_ports() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.tcp_port, 55557);
        assert_eq!(cfg.http_port, 30010);
        assert_eq!(cfg.ws_port, 30011);
        assert_eq!(cfg.max_connections, 10);
        assert!(cfg.bind_host.is_loopback());
    }

    #[test]
    fn builders_override_fields() {
        let cfg = ServerConfig::default()
            .with_ports(1, 2, 3)
            .with_max_connections(4);
        assert_eq!(cfg.tcp_addr().port(), 1);
        assert_eq!(cfg.http_addr().port(), 2);
        assert_eq!(cfg.ws_addr().port(), 3);
        assert_eq!(cfg.max_connections, 4);
    }

    #[test]
    fn parse_list_drops_blanks() {
        assert_eq!(
            parse_list(" SpotLight, ,CameraActor,"),
            vec!["SpotLight".to_string(), "CameraActor".to_string()]
        );
    }

    #[test]
    fn parse_env_falls_back_on_missing_key() {
        assert_eq!(parse_env("BRIDGE_TEST_UNSET_KEY_0xA1", 7u16), 7);
    }
}

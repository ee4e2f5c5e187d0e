//! editor-bridge entry point.
//!
//! Starts the TCP, HTTP and WebSocket listeners against a headless
//! in-memory editor and runs until Ctrl-C.

use std::sync::Arc;

use anyhow::{Context, bail};
use tracing_subscriber::EnvFilter;

use editor_bridge::config::ServerConfig;
use editor_bridge::editor::InMemoryEditor;
use editor_bridge::server::ServerManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // Load configuration
    let config = ServerConfig::from_env()
        .map_err(|err| anyhow::anyhow!("{err}"))
        .context("invalid configuration")?;
    tracing::info!(
        host = %config.bind_host,
        tcp = config.tcp_port,
        http = config.http_port,
        ws = config.ws_port,
        max_connections = config.max_connections,
        "starting editor-bridge"
    );

    // Build editor collaborator and manager
    let editor = Arc::new(InMemoryEditor::from_config(&config));
    let manager = ServerManager::with_editor(config, editor);

    if !manager.start_all().await {
        bail!("no listener could be started");
    }
    for status in manager.status().await {
        tracing::info!("{status}");
    }

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    tracing::info!("shutdown requested");

    manager.stop_all().await;
    Ok(())
}

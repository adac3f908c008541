//! Forward HTTP/HTTPS proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │                  FORWARD PROXY                   │
//!   Client           │  ┌──────────┐   ┌────────────┐   ┌───────────┐   │
//!   ─────────────────┼─▶│   net    │──▶│  dispatch  │──▶│   http    │   │
//!                    │  │ acceptor │   │ dispatcher │   │ resolve / │   │
//!                    │  └──────────┘   └─────┬──────┘   │ rewrite   │   │
//!                    │                       │          └───────────┘   │
//!                    │            CONNECT    │    plain HTTP            │
//!                    │          ┌────────────┴────────────┐             │
//!                    │          ▼                         ▼             │
//!                    │  ┌───────────────┐        ┌───────────────┐      │
//!   ◀────────────────┼──│ relay: 2 pumps│        │ relay: 1 pump │──────┼──▶ Upstream
//!                    │  └───────────────┘        └───────────────┘      │
//!                    │                                                  │
//!                    │  config · observability · record · lifecycle     │
//!                    └──────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```text
//! forward-proxy <port> [log] [--config proxy.toml]
//! ```
//!
//! The proxy runs until stdin reaches end-of-file or Ctrl+C is pressed.

use std::path::PathBuf;

use clap::Parser;

use forward_proxy::config::{load_config, ProxyConfig};
use forward_proxy::lifecycle::{signals, startup};
use forward_proxy::observability;

#[derive(Debug, Parser)]
#[command(name = "forward-proxy")]
#[command(about = "Forward HTTP proxy with CONNECT tunnelling", long_about = None)]
struct Cli {
    /// Port to listen on (all interfaces unless the config file says otherwise).
    port: u16,

    /// Pass `log` to record every request as JSON under ./Log.
    mode: Option<String>,

    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn recording_requested(&self) -> bool {
        self.mode
            .as_deref()
            .map(|mode| mode.eq_ignore_ascii_case("log"))
            .unwrap_or(false)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    config.listener.set_port(cli.port);
    if cli.recording_requested() {
        config.recording.enabled = true;
    }

    observability::init_logging(&config.observability.log_level);
    tracing::info!("forward-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        buffer_size = config.relay.buffer_size,
        connect_timeout_secs = ?config.timeouts.connect_secs,
        idle_timeout_secs = ?config.timeouts.idle_secs,
        recording = config.recording.enabled,
        "Configuration loaded"
    );

    let proxy = startup::start(&config).await?;

    signals::shutdown_requested().await;

    let active = proxy.tracker().active_count();
    proxy.shutdown().await;

    tracing::info!(active_sessions = active, "Shutdown complete");
    Ok(())
}

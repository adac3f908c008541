//! Startup orchestration.
//!
//! # Responsibilities
//! - Prepare the record root when recording is enabled
//! - Start the metrics exporter when enabled
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast only on bind errors; everything else degrades with a warning
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::ProxyConfig;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::lifecycle::shutdown::Shutdown;
use crate::net::{Acceptor, ConnectionTracker};
use crate::observability::metrics;
use crate::record::RecordStore;

/// A running proxy: the accept loop task and its shutdown handle.
#[derive(Debug)]
pub struct RunningProxy {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    tracker: ConnectionTracker,
    accept_task: JoinHandle<()>,
}

impl RunningProxy {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    /// Close the listening socket. Sessions already accepted keep running.
    pub async fn shutdown(self) {
        self.shutdown.trigger();
        if let Err(e) = self.accept_task.await {
            tracing::error!(error = %e, "Accept loop ended abnormally");
        }
    }
}

/// Start the proxy described by `config`.
pub async fn start(config: &ProxyConfig) -> Result<RunningProxy> {
    let records = if config.recording.enabled {
        Some(prepare_records(config).await?)
    } else {
        None
    };

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let dispatcher = Arc::new(Dispatcher::from_config(config, records));
    let acceptor = Acceptor::bind(&config.listener).await?;
    let local_addr = acceptor.local_addr()?;
    let tracker = acceptor.tracker();

    let shutdown = Shutdown::new();
    let accept_task = tokio::spawn(acceptor.run(dispatcher, shutdown.subscribe()));

    tracing::info!(
        address = %local_addr,
        recording = config.recording.enabled,
        "Proxy accepting connections"
    );

    Ok(RunningProxy {
        local_addr,
        shutdown,
        tracker,
        accept_task,
    })
}

async fn prepare_records(config: &ProxyConfig) -> Result<RecordStore> {
    let root = std::env::current_dir()?.join(&config.recording.directory);
    let store = RecordStore::new(root);
    if let Err(e) = store.ensure_root().await {
        tracing::warn!(error = %e, "Failed to create record directory, records may be lost");
    } else {
        tracing::info!(directory = %store.root().display(), "Recording requests");
    }
    Ok(store)
}

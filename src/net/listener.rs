//! TCP accept loop.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Accept incoming TCP connections
//! - Spawn one dispatcher task per client, without any concurrency limit
//! - Stop accepting and close the listening socket on shutdown
//!
//! # Design Decisions
//! - No backpressure: every accepted client gets a task immediately
//! - Accept errors are logged and the loop continues
//! - Spawned sessions are detached; shutdown does not wait for them

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::Instrument;

use crate::config::ListenerConfig;
use crate::dispatch::Dispatcher;
use crate::error::{ProxyError, Result};
use crate::net::connection::{ClientSession, ConnectionTracker};

/// Owns the listening socket and hands clients to the dispatcher.
pub struct Acceptor {
    inner: TcpListener,
    tracker: ConnectionTracker,
}

impl Acceptor {
    /// Bind to the configured address.
    pub async fn bind(config: &ListenerConfig) -> Result<Self> {
        let bind_error = |source| ProxyError::Bind {
            address: config.bind_address.clone(),
            source,
        };

        let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
            bind_error(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
        })?;
        let listener = TcpListener::bind(addr).await.map_err(bind_error)?;

        Ok(Self::from_listener(listener))
    }

    /// Wrap an already bound listener.
    pub fn from_listener(listener: TcpListener) -> Self {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(address = %addr, "Listener bound");
        }
        Self {
            inner: listener,
            tracker: ConnectionTracker::new(),
        }
    }

    pub fn local_addr(&self) -> std::result::Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }

    /// Tracker counting sessions started by this acceptor.
    pub fn tracker(&self) -> ConnectionTracker {
        self.tracker.clone()
    }

    /// Accept clients until `shutdown` fires, then drop the listening socket.
    pub async fn run(self, dispatcher: Arc<Dispatcher>, mut shutdown: broadcast::Receiver<()>) {
        loop {
            let accepted = tokio::select! {
                _ = shutdown.recv() => break,
                accepted = self.inner.accept() => accepted,
            };

            let (stream, peer_addr) = match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::warn!(error = %ProxyError::Accept(e), "Accept failed");
                    continue;
                }
            };

            if let Err(e) = stream.set_nodelay(true) {
                tracing::debug!(peer_addr = %peer_addr, error = %e, "Failed to set TCP_NODELAY");
            }

            let guard = self.tracker.track();
            let span = tracing::info_span!("session", connection_id = %guard.id(), peer_addr = %peer_addr);
            tracing::debug!(parent: &span, "Connection accepted");

            let session = ClientSession {
                peer_addr,
                stream,
                guard,
            };
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(
                async move {
                    if let Err(e) = dispatcher.dispatch(session).await {
                        tracing::warn!(error = %e, "Session aborted");
                    }
                }
                .instrument(span),
            );
        }

        tracing::info!(
            active_sessions = self.tracker.active_count(),
            "Listener closed, in-flight sessions left running"
        );
    }
}

//! Upstream connection establishment.

use std::time::Duration;

use tokio::net::TcpStream;

use crate::error::{ProxyError, Result};
use crate::http::ResolvedTarget;
use crate::resilience::with_timeout;

/// Opens TCP connections to resolved targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpstreamConnector {
    connect_timeout: Option<Duration>,
}

impl UpstreamConnector {
    pub fn new(connect_timeout: Option<Duration>) -> Self {
        Self { connect_timeout }
    }

    /// Connect to `target`.
    ///
    /// A target without a host cannot be dialled and fails like an
    /// unreachable upstream.
    pub async fn connect(&self, target: &ResolvedTarget) -> Result<TcpStream> {
        let Some(host) = target.host.as_deref() else {
            return Err(ProxyError::UnresolvedHost { port: target.port });
        };

        let stream = with_timeout(
            self.connect_timeout,
            "upstream connect",
            TcpStream::connect((host, target.port)),
        )
        .await
        .map_err(|e| match e {
            ProxyError::Io(source) => ProxyError::Connect {
                target: target.to_string(),
                source,
            },
            other => other,
        })?;

        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(target = %target, error = %e, "Failed to set TCP_NODELAY on upstream");
        }
        Ok(stream)
    }
}

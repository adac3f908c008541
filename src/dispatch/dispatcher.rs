//! Per-client request dispatch.
//!
//! # State Machine
//! ```text
//! AwaitRequest ──empty read──────────────────────────────▶ Teardown
//!      │
//!      ▼
//!   Resolve ──CONNECT──▶ Tunnel ──connect failed: 502────▶ Teardown
//!      │                   └────connected: 200, two pumps (own sockets)
//!      └──otherwise──▶ Forward ──connect failed──────────▶ Teardown (error)
//!                          └────rewritten request sent, one pump (owns sockets)
//! ```
//!
//! Exactly one request is handled per client connection. A single read is
//! treated as the whole request; heads larger than one read are not
//! reassembled.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

use crate::config::ProxyConfig;
use crate::dispatch::upstream::UpstreamConnector;
use crate::error::{ProxyError, Result};
use crate::http::decode::decode_lossy;
use crate::http::{HandshakeReply, RequestHead, ResolvedTarget, rewrite_header};
use crate::net::connection::{ClientSession, ConnectionGuard};
use crate::observability::metrics;
use crate::record::{Event, RecordStore, RequestRecord};
use crate::relay::{PumpReport, RelayOptions, TunnelHandles, spawn_forward, spawn_tunnel};
use crate::resilience::with_timeout;

/// How a session was dispatched.
///
/// Relay handles are returned for observation only; nothing needs to await
/// them for the session to make progress.
#[derive(Debug)]
pub enum Dispatch {
    /// The client closed before sending anything.
    ClientClosed,
    /// CONNECT upstream was unreachable; the client got a 502.
    BadGateway,
    /// CONNECT tunnel running.
    Tunnel(TunnelHandles),
    /// Plain request forwarded; the response pump is running.
    Forward(JoinHandle<PumpReport>),
}

/// Resolves each client's request and starts the matching relay.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    connector: UpstreamConnector,
    relay: RelayOptions,
    records: Option<RecordStore>,
}

impl Dispatcher {
    pub fn new(connector: UpstreamConnector, relay: RelayOptions, records: Option<RecordStore>) -> Self {
        Self {
            connector,
            relay,
            records,
        }
    }

    /// Build a dispatcher from configuration. `records` is the resolved
    /// record root when recording is enabled.
    pub fn from_config(config: &ProxyConfig, records: Option<RecordStore>) -> Self {
        let relay = RelayOptions {
            buffer_size: config.relay.buffer_size,
            idle_timeout: config.timeouts.idle(),
        };
        Self::new(UpstreamConnector::new(config.timeouts.connect()), relay, records)
    }

    pub async fn dispatch(&self, session: ClientSession) -> Result<Dispatch> {
        let ClientSession {
            peer_addr,
            mut stream,
            guard,
        } = session;

        let mut buf = vec![0u8; self.relay.buffer_size];
        let n = with_timeout(self.relay.idle_timeout, "request read", stream.read(&mut buf)).await?;
        if n == 0 {
            tracing::debug!(peer_addr = %peer_addr, "Client closed before sending a request");
            return Ok(Dispatch::ClientClosed);
        }
        let raw = &buf[..n];

        let head = RequestHead::parse(raw);
        let target = head.resolve();
        tracing::info!(
            peer_addr = %peer_addr,
            request = %head.summary(),
            target = %target,
            "Request received"
        );

        let record = self.open_record(&target, head.text()).await;

        if head.is_connect() {
            self.tunnel(stream, peer_addr, target, record, guard).await
        } else {
            self.forward(stream, raw, target, record, guard).await
        }
    }

    async fn tunnel(
        &self,
        mut client: TcpStream,
        peer_addr: SocketAddr,
        target: ResolvedTarget,
        record: Option<RequestRecord>,
        guard: ConnectionGuard,
    ) -> Result<Dispatch> {
        metrics::request_dispatched("connect");

        let upstream = match self.connector.connect(&target).await {
            Ok(upstream) => upstream,
            Err(e) => {
                metrics::upstream_failed("connect");
                tracing::warn!(target = %target, error = %e, "Tunnel upstream unreachable");

                let reply = HandshakeReply::BadGateway;
                if let Err(e) = client.write_all(reply.as_bytes()).await {
                    tracing::debug!(peer_addr = %peer_addr, error = %e, "Failed to send 502 to client");
                }
                if let Some(record) = &record {
                    record.record(Event::ProxyResponseSent, reply.as_str()).await;
                }
                let _ = client.shutdown().await;
                return Ok(Dispatch::BadGateway);
            }
        };

        let reply = HandshakeReply::Established;
        client.write_all(reply.as_bytes()).await?;
        if let Some(record) = &record {
            record.record(Event::ProxyResponseSent, reply.as_str()).await;
        }

        tracing::debug!(target = %target, "Tunnel established");
        Ok(Dispatch::Tunnel(spawn_tunnel(client, upstream, self.relay, guard)))
    }

    async fn forward(
        &self,
        client: TcpStream,
        request: &[u8],
        target: ResolvedTarget,
        record: Option<RequestRecord>,
        guard: ConnectionGuard,
    ) -> Result<Dispatch> {
        metrics::request_dispatched("forward");

        let mut upstream = self.connector.connect(&target).await.inspect_err(|_| {
            metrics::upstream_failed("forward");
        })?;

        let rewritten = rewrite_header(request);
        if let Some(record) = &record {
            record.record(Event::ModifiedHeader, &decode_lossy(&rewritten)).await;
        }
        upstream.write_all(&rewritten).await.map_err(ProxyError::from)?;

        tracing::debug!(target = %target, bytes = rewritten.len(), "Request forwarded");
        Ok(Dispatch::Forward(spawn_forward(upstream, client, self.relay, record, guard)))
    }

    /// Start the request record. Requests without a host are not recorded.
    async fn open_record(&self, target: &ResolvedTarget, text: &str) -> Option<RequestRecord> {
        let store = self.records.as_ref()?;
        let host = target.host.as_deref()?;
        match store.open(host, text).await {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(host = %host, error = %e, "Failed to create request record");
                None
            }
        }
    }
}

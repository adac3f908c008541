//! Task wiring for relays.
//!
//! A CONNECT tunnel is two pumps over the same socket pair, each on its own
//! task. A plain forward is a single upstream-to-client pump.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::net::connection::ConnectionGuard;
use crate::record::RequestRecord;
use crate::relay::pump::{DEFAULT_BUFFER_SIZE, Direction, PumpReport, RelayPump};
use crate::relay::teardown::Teardown;

/// Settings shared by every pump of a session.
#[derive(Debug, Clone, Copy)]
pub struct RelayOptions {
    pub buffer_size: usize,
    pub idle_timeout: Option<Duration>,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            idle_timeout: None,
        }
    }
}

/// Handles of the two pump tasks of a tunnel.
#[derive(Debug)]
pub struct TunnelHandles {
    pub client_to_upstream: JoinHandle<PumpReport>,
    pub upstream_to_client: JoinHandle<PumpReport>,
}

/// Start a full-duplex tunnel between `client` and `upstream`.
///
/// The pumps take ownership of both sockets. The session guard is released
/// once both pumps have stopped.
pub fn spawn_tunnel(
    client: TcpStream,
    upstream: TcpStream,
    options: RelayOptions,
    guard: ConnectionGuard,
) -> TunnelHandles {
    let (client_read, client_write) = client.into_split();
    let (upstream_read, upstream_write) = upstream.into_split();
    let teardown = Teardown::new();
    let guard = Arc::new(guard);

    let outbound = RelayPump::new(client_read, upstream_write, Direction::ClientToUpstream, teardown.clone())
        .buffer_size(options.buffer_size)
        .idle_timeout(options.idle_timeout);
    let inbound = RelayPump::new(upstream_read, client_write, Direction::UpstreamToClient, teardown)
        .buffer_size(options.buffer_size)
        .idle_timeout(options.idle_timeout);

    let outbound_guard = Arc::clone(&guard);
    let client_to_upstream = tokio::spawn(
        async move {
            let report = outbound.run().await;
            drop(outbound_guard);
            report
        }
        .in_current_span(),
    );
    let upstream_to_client = tokio::spawn(
        async move {
            let report = inbound.run().await;
            drop(guard);
            report
        }
        .in_current_span(),
    );

    TunnelHandles {
        client_to_upstream,
        upstream_to_client,
    }
}

/// Start the upstream-to-client pump of a plain-HTTP forward.
///
/// Nothing else is read from the client once its request was forwarded.
pub fn spawn_forward(
    upstream: TcpStream,
    client: TcpStream,
    options: RelayOptions,
    record: Option<RequestRecord>,
    guard: ConnectionGuard,
) -> JoinHandle<PumpReport> {
    let pump = RelayPump::new(upstream, client, Direction::UpstreamToClient, Teardown::new())
        .buffer_size(options.buffer_size)
        .idle_timeout(options.idle_timeout)
        .record(record);

    tokio::spawn(
        async move {
            let report = pump.run().await;
            drop(guard);
            report
        }
        .in_current_span(),
    )
}

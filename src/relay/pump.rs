//! Single-direction byte pump.
//!
//! # Responsibilities
//! - Copy chunks from a source stream to a destination stream, in order
//! - Record upstream response chunks when a request record is attached
//! - Tear down the whole session on any I/O failure
//!
//! # Termination
//! - Source reaches end-of-stream: the destination is shut down for writing
//!   and the pump finishes. The opposite direction keeps running.
//! - Read or write error (or idle timeout): the shared [`Teardown`] fires,
//!   stopping the peer pump as well. Both pumps drop their socket halves.
//! - Teardown fired by the peer: the pump stops without further I/O.

use std::fmt;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::ProxyError;
use crate::http::decode::decode_lossy;
use crate::observability::metrics;
use crate::record::{Event, RequestRecord};
use crate::relay::teardown::Teardown;
use crate::resilience::with_timeout;

/// Chunk size used when none is configured.
pub const DEFAULT_BUFFER_SIZE: usize = 2048;

/// Which way a pump carries traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ClientToUpstream,
    UpstreamToClient,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::ClientToUpstream => "client_to_upstream",
            Direction::UpstreamToClient => "upstream_to_client",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a pump stopped.
#[derive(Debug)]
pub enum PumpEnd {
    /// The source reached end-of-stream.
    SourceClosed,
    /// A read or write failed; the session was torn down.
    Failed(ProxyError),
    /// The peer pump tore the session down.
    TornDown,
}

/// Summary returned when a pump stops.
#[derive(Debug)]
pub struct PumpReport {
    pub direction: Direction,
    pub bytes: u64,
    pub end: PumpEnd,
}

/// Copies bytes from `source` to `destination` until one side fails.
///
/// The pump owns both ends; they are dropped (and thereby closed) when
/// [`RelayPump::run`] returns.
pub struct RelayPump<R, W> {
    source: R,
    destination: W,
    direction: Direction,
    teardown: Teardown,
    buffer_size: usize,
    idle_timeout: Option<Duration>,
    record: Option<RequestRecord>,
}

impl<R, W> RelayPump<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(source: R, destination: W, direction: Direction, teardown: Teardown) -> Self {
        Self {
            source,
            destination,
            direction,
            teardown,
            buffer_size: DEFAULT_BUFFER_SIZE,
            idle_timeout: None,
            record: None,
        }
    }

    /// Maximum bytes read per chunk.
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Fail the pump if the source stays silent for this long.
    pub fn idle_timeout(mut self, limit: Option<Duration>) -> Self {
        self.idle_timeout = limit;
        self
    }

    /// Attach the request record. Only upstream-to-client pumps write to it.
    pub fn record(mut self, record: Option<RequestRecord>) -> Self {
        self.record = record;
        self
    }

    pub async fn run(mut self) -> PumpReport {
        let mut buf = vec![0u8; self.buffer_size];
        let mut bytes = 0u64;

        let end = loop {
            let read = tokio::select! {
                biased;
                _ = self.teardown.triggered() => break PumpEnd::TornDown,
                read = with_timeout(self.idle_timeout, "relay read", self.source.read(&mut buf)) => read,
            };

            let n = match read {
                Ok(0) => {
                    let _ = self.destination.shutdown().await;
                    break PumpEnd::SourceClosed;
                }
                Ok(n) => n,
                Err(e) => {
                    self.teardown.trigger();
                    break PumpEnd::Failed(e);
                }
            };

            if self.direction == Direction::UpstreamToClient {
                if let Some(record) = &self.record {
                    record
                        .record(Event::ServerResponseReceived, &decode_lossy(&buf[..n]))
                        .await;
                }
            }

            let written = tokio::select! {
                biased;
                _ = self.teardown.triggered() => break PumpEnd::TornDown,
                written = self.destination.write_all(&buf[..n]) => written,
            };
            if let Err(e) = written {
                self.teardown.trigger();
                break PumpEnd::Failed(e.into());
            }

            bytes += n as u64;
            metrics::bytes_relayed(self.direction.as_str(), n);
        };

        match &end {
            PumpEnd::Failed(e) => {
                tracing::debug!(direction = %self.direction, bytes, error = %e, "Relay failed, tearing down")
            }
            _ => tracing::trace!(direction = %self.direction, bytes, end = ?end, "Relay finished"),
        }

        PumpReport {
            direction: self.direction,
            bytes,
            end,
        }
    }
}

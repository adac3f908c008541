//! Crate-wide error type.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors produced while accepting, dispatching and relaying sessions.
///
/// Only [`ProxyError::Bind`] is fatal to the process. Everything else is
/// scoped to a single client session.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to accept connection: {0}")]
    Accept(#[source] std::io::Error),

    #[error("failed to connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("request did not name a host (port {port})")]
    UnresolvedHost { port: u16 },

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("record {path:?}: {source}")]
    Record {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProxyError>;

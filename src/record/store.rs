//! Per-request JSON records.
//!
//! Layout on disk:
//! ```text
//! <root>/<host>/<host>.<uuid>.json
//! ```
//! Each document is a flat string-to-string object. Every event re-reads the
//! whole file, merges one key and rewrites it. A record is owned by exactly
//! one task at a time, so there is never more than one writer per file.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{ProxyError, Result};

/// Label under which an event body is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    IncomingHeader,
    ModifiedHeader,
    ProxyResponseSent,
    ServerResponseReceived,
}

impl Event {
    pub fn label(&self) -> &'static str {
        match self {
            Event::IncomingHeader => "Incoming header",
            Event::ModifiedHeader => "Modified header",
            Event::ProxyResponseSent => "Proxy response sent",
            Event::ServerResponseReceived => "Server response received",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Root directory under which request records are created.
#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if it does not exist yet.
    pub async fn ensure_root(&self) -> Result<()> {
        create_dir(&self.root).await
    }

    /// Start a record for one request to `host`, seeded with the request text.
    pub async fn open(&self, host: &str, incoming_header: &str) -> Result<RequestRecord> {
        let name = directory_name(host);
        let dir = self.root.join(&name);
        create_dir(&dir).await?;

        let path = dir.join(format!("{}.{}.json", name, Uuid::new_v4()));
        let mut document = Map::new();
        document.insert(
            Event::IncomingHeader.label().to_string(),
            Value::String(incoming_header.to_string()),
        );
        write_document(&path, &document).await?;

        tracing::debug!(path = %path.display(), "Request record created");
        Ok(RequestRecord { path })
    }
}

/// Exclusive handle to one request's record document.
#[derive(Debug)]
pub struct RequestRecord {
    path: PathBuf,
}

impl RequestRecord {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store `body` under `event`. Failures are logged and swallowed.
    pub async fn record(&self, event: Event, body: &str) {
        if let Err(e) = self.try_record(event, body).await {
            tracing::warn!(event = %event, error = %e, "Failed to write request record");
        }
    }

    /// Store `body` under `event`, replacing any earlier body for that event.
    pub async fn try_record(&self, event: Event, body: &str) -> Result<()> {
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|e| record_error(&self.path, e))?;
        let mut document: Map<String, Value> = serde_json::from_slice(&raw)
            .map_err(|e| record_error(&self.path, io::Error::from(e)))?;

        document.insert(event.label().to_string(), Value::String(body.to_string()));
        write_document(&self.path, &document).await
    }
}

async fn create_dir(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| record_error(path, e))
}

async fn write_document(path: &Path, document: &Map<String, Value>) -> Result<()> {
    let encoded = encode_document(document).map_err(|e| record_error(path, io::Error::from(e)))?;
    tokio::fs::write(path, encoded)
        .await
        .map_err(|e| record_error(path, e))
}

fn encode_document(document: &Map<String, Value>) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"   ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    document.serialize(&mut serializer)?;
    Ok(buf)
}

/// Directory and file name prefix for a host.
///
/// Hosts come straight from client input, so anything that could escape the
/// record root is replaced.
fn directory_name(host: &str) -> String {
    let name: String = host
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if name.is_empty() || name.chars().all(|c| c == '.') {
        return "_".to_string();
    }
    name
}

fn record_error(path: &Path, source: io::Error) -> ProxyError {
    ProxyError::Record {
        path: path.to_path_buf(),
        source,
    }
}

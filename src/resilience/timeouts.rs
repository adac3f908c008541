//! Optional deadlines for socket operations.
//!
//! # Design Decisions
//! - No deadline unless one is configured; the default is to wait forever
//! - Timeout errors are distinct from I/O errors (`ProxyError::Timeout`)

use std::future::Future;
use std::time::Duration;

use crate::error::{ProxyError, Result};

/// Run `fut`, failing with [`ProxyError::Timeout`] if `limit` elapses first.
pub async fn with_timeout<T, F>(limit: Option<Duration>, operation: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = std::io::Result<T>>,
{
    match limit {
        Some(after) => match tokio::time::timeout(after, fut).await {
            Ok(result) => result.map_err(ProxyError::from),
            Err(_) => Err(ProxyError::Timeout { operation, after }),
        },
        None => fut.await.map_err(ProxyError::from),
    }
}

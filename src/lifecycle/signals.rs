//! Process shutdown signals.
//!
//! The proxy stops when its console input reaches end-of-file (Ctrl+D, or a
//! closed pipe) or on Ctrl+C, whichever comes first.

use tokio::io::{AsyncBufReadExt, BufReader};

/// Resolves when stdin reaches end-of-file or fails.
pub async fn console_closed() {
    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut line = Vec::new();
    loop {
        line.clear();
        match stdin.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(error = %e, "Console read failed");
                break;
            }
        }
    }
}

/// Wait for the first shutdown request.
pub async fn shutdown_requested() {
    tokio::select! {
        _ = console_closed() => tracing::info!("Console input closed, shutting down"),
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => tracing::info!("Ctrl+C received, shutting down"),
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C, shutting down"),
        },
    }
}

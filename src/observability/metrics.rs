//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_sessions_total` (counter): accepted client connections
//! - `proxy_active_sessions` (gauge): sessions whose dispatcher or pumps are alive
//! - `proxy_requests_total` (counter): requests by `mode` (connect, forward)
//! - `proxy_upstream_failures_total` (counter): failed upstream connects by `mode`
//! - `proxy_relay_bytes_total` (counter): relayed bytes by `direction`
//!
//! Recording goes through the `metrics` facade and is a no-op until
//! [`init_metrics`] installs the Prometheus exporter.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP scrape listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn session_opened() {
    counter!("proxy_sessions_total").increment(1);
    gauge!("proxy_active_sessions").increment(1.0);
}

pub fn session_closed() {
    gauge!("proxy_active_sessions").decrement(1.0);
}

pub fn request_dispatched(mode: &'static str) {
    counter!("proxy_requests_total", "mode" => mode).increment(1);
}

pub fn upstream_failed(mode: &'static str) {
    counter!("proxy_upstream_failures_total", "mode" => mode).increment(1);
}

pub fn bytes_relayed(direction: &'static str, bytes: usize) {
    counter!("proxy_relay_bytes_total", "direction" => direction).increment(bytes as u64);
}

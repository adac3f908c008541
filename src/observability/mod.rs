//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, per-session spans)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! Request records under `Log/` are not part of this subsystem; see
//! `crate::record`.

pub mod logging;
pub mod metrics;

pub use logging::init_logging;

//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream connect, relay reads:
//!     → timeouts.rs (optional deadline, off by default)
//! ```
//!
//! # Design Decisions
//! - No retries: a failed upstream ends the session
//! - Timeouts are opt-in hardening; unset means wait indefinitely

pub mod timeouts;

pub use timeouts::with_timeout;

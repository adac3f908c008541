//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, one task per client)
//!     → connection.rs (session id, lifetime tracking)
//!     → Hand off to dispatch layer
//! ```
//!
//! # Design Decisions
//! - Unbounded: no connection limit, no accept queue beyond the kernel's
//! - Shutdown closes the listening socket only; sessions are not drained

pub mod connection;
pub mod listener;

pub use connection::{ClientSession, ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::Acceptor;

//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! ClientSession (from net::listener)
//!     → dispatcher.rs (read one request, resolve, branch)
//!     → upstream.rs (connect to the resolved host:port)
//!     → relay (tunnel pumps or forward pump take over the sockets)
//! ```

pub mod dispatcher;
pub mod upstream;

pub use dispatcher::{Dispatch, Dispatcher};
pub use upstream::UpstreamConnector;

//! HTTP text handling subsystem.
//!
//! # Data Flow
//! ```text
//! First chunk read from the client
//!     → decode.rs (bytes → text, invalid bytes escaped)
//!     → request.rs (request line, Host header → ResolvedTarget)
//!     → rewrite.rs (plain HTTP only: HTTP/1.0 + Connection: close)
//!     → response.rs (CONNECT only: 200 / 502 handshake reply)
//! ```
//!
//! # Design Decisions
//! - No HTTP parser: the proxy only inspects the request head as text
//! - Resolution is best-effort and never fails
//! - Responses from upstream are never parsed or modified

pub mod decode;
pub mod request;
pub mod response;
pub mod rewrite;

pub use request::{RequestHead, ResolvedTarget, resolve_target};
pub use response::HandshakeReply;
pub use rewrite::rewrite_header;

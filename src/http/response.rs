//! Responses the proxy itself writes to clients.
//!
//! The proxy only ever answers CONNECT handshakes. Plain requests get the
//! upstream's bytes verbatim.

/// Sent once the upstream for a CONNECT tunnel is connected.
pub const CONNECT_ESTABLISHED: &str = "HTTP/1.0 200 OK\r\n\r\n";

/// Sent when the upstream for a CONNECT tunnel cannot be reached.
pub const BAD_GATEWAY: &str = "HTTP/1.0 502 Bad Gateway\r\n\r\n";

/// Outcome of a CONNECT handshake, as reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeReply {
    Established,
    BadGateway,
}

impl HandshakeReply {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandshakeReply::Established => CONNECT_ESTABLISHED,
            HandshakeReply::BadGateway => BAD_GATEWAY,
        }
    }

    pub fn as_bytes(&self) -> &'static [u8] {
        self.as_str().as_bytes()
    }
}

//! Header rewriting for plain-HTTP forwarding.
//!
//! Forwarded requests are downgraded to HTTP/1.0 and asked to close, so the
//! upstream ends the response by closing the connection. The substitution is
//! done on raw bytes; anything that is not one of the two tokens is passed
//! through untouched, including bodies that are not valid UTF-8.

const PROTOCOL_FROM: &[u8] = b"HTTP/1.1";
const PROTOCOL_TO: &[u8] = b"HTTP/1.0";
const CONNECTION_FROM: &[u8] = b"keep-alive";
const CONNECTION_TO: &[u8] = b"close";

/// Rewrite a request for forwarding.
///
/// Every `HTTP/1.1` becomes `HTTP/1.0` and every `keep-alive` becomes
/// `close`. The input is not modified.
pub fn rewrite_header(request: &[u8]) -> Vec<u8> {
    let downgraded = replace_all(request, PROTOCOL_FROM, PROTOCOL_TO);
    replace_all(&downgraded, CONNECTION_FROM, CONNECTION_TO)
}

fn replace_all(haystack: &[u8], from: &[u8], to: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(haystack.len());
    let mut index = 0;

    while index < haystack.len() {
        if haystack[index..].starts_with(from) {
            out.extend_from_slice(to);
            index += from.len();
        } else {
            out.push(haystack[index]);
            index += 1;
        }
    }
    out
}

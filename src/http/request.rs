//! Request head parsing and destination resolution.
//!
//! # Responsibilities
//! - Decode the first chunk a client sends into request text
//! - Resolve the destination `(host, port)` from the Host header and request line
//! - Classify the request as a CONNECT tunnel or a plain forward
//!
//! # Resolution Order
//! 1. `Host` header. A value carrying a valid port resolves immediately.
//!    A value without one only records the host; the port search continues.
//!    Only header lines are scanned; the blank line ends the search.
//! 2. Request line. The port of the target authority (`host:port` of a
//!    CONNECT, or `scheme://host:port` of an absolute URI) wins. Otherwise
//!    the whole text after any colon must be all digits.
//! 3. Fallback port: 403 when the request line mentions `https://`, else 80.
//!
//! Bracketed IPv6 literals (`[::1]:443`) are split at the closing bracket and
//! resolve to the bare address.
//!
//! Resolution never fails. A missing host is reported as `None` and left for
//! the caller to deal with.

use std::fmt;

use crate::http::decode::decode_lossy;

/// Port used when nothing in the request names one.
pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Port used for `https://` targets without an explicit port.
///
/// Deliberately 403, not 443: existing deployments depend on it.
pub const LEGACY_HTTPS_PORT: u16 = 403;

/// Destination computed once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub host: Option<String>,
    pub port: u16,
}

impl ResolvedTarget {
    pub fn new(host: Option<String>, port: u16) -> Self {
        Self { host, port }
    }
}

impl fmt::Display for ResolvedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.host {
            Some(host) if host.contains(':') => write!(f, "[{}]:{}", host, self.port),
            Some(host) => write!(f, "{}:{}", host, self.port),
            None => write!(f, "<unresolved>:{}", self.port),
        }
    }
}

/// The decoded first chunk of a client request.
///
/// Only a single read is ever decoded; requests whose head is larger than
/// one read are resolved from the partial text.
#[derive(Debug, Clone)]
pub struct RequestHead {
    text: String,
}

impl RequestHead {
    /// Decode raw bytes received from the client.
    pub fn parse(raw: &[u8]) -> Self {
        Self {
            text: decode_lossy(raw),
        }
    }

    /// Full decoded request text, headers and any body bytes included.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The first line of the request, or `""` for blank input.
    pub fn request_line(&self) -> &str {
        self.text.lines().next().unwrap_or("")
    }

    /// The method token of the request line.
    pub fn method(&self) -> Option<&str> {
        self.request_line().split_whitespace().next()
    }

    /// Whether the client asked for a CONNECT tunnel.
    pub fn is_connect(&self) -> bool {
        self.method()
            .map(|method| method.eq_ignore_ascii_case("connect"))
            .unwrap_or(false)
    }

    /// Request line without the protocol version, for access logs.
    pub fn summary(&self) -> &str {
        let line = self.request_line();
        let end = line
            .to_ascii_lowercase()
            .find("http/")
            .unwrap_or(line.len());
        line[..end].trim_end()
    }

    /// Resolve the destination of this request.
    pub fn resolve(&self) -> ResolvedTarget {
        let lines: Vec<&str> = self.text.lines().collect();
        resolve_target(&lines)
    }
}

/// Resolve `(host, port)` from request lines.
///
/// The first element is the request line, the rest are header lines.
pub fn resolve_target<S: AsRef<str>>(lines: &[S]) -> ResolvedTarget {
    let request_line = lines.first().map(|line| line.as_ref()).unwrap_or("");
    let mut host = None;

    for line in lines.iter().skip(1).map(|line| line.as_ref()) {
        if line.trim().is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if !name.trim().eq_ignore_ascii_case("host") {
            continue;
        }

        let (name, port) = split_host_port(value.trim());
        host = non_empty(name);
        if let Some(port) = port.and_then(parse_port) {
            return ResolvedTarget::new(host, port);
        }
        // Only the first Host header counts.
        break;
    }

    let authority = target_authority(request_line);
    let host = host.or_else(|| authority.and_then(|authority| non_empty(split_host_port(authority).0)));

    let port = authority
        .and_then(|authority| split_host_port(authority).1)
        .and_then(parse_port)
        .or_else(|| scan_port(request_line));
    if let Some(port) = port {
        return ResolvedTarget::new(host, port);
    }

    let port = if request_line.contains("https://") {
        LEGACY_HTTPS_PORT
    } else {
        DEFAULT_HTTP_PORT
    };
    ResolvedTarget::new(host, port)
}

/// Find a colon in the request line followed by nothing but a port.
fn scan_port(request_line: &str) -> Option<u16> {
    request_line
        .match_indices(':')
        .find_map(|(index, _)| parse_port(request_line[index + 1..].trim()))
}

/// Authority named by the request target.
///
/// Handles authority-form (`host:port`) and absolute URIs. Origin-form
/// targets (`/path`) and `*` carry no authority.
fn target_authority(request_line: &str) -> Option<&str> {
    let target = request_line.split_whitespace().nth(1)?;
    let authority = match target.split_once("://") {
        Some((_, rest)) => rest.split(['/', '?', '#']).next().unwrap_or(""),
        None if target.starts_with('/') || target == "*" => return None,
        None => target,
    };
    Some(authority.rsplit_once('@').map_or(authority, |(_, host)| host))
}

/// Split `host[:port]`, keeping the colons of a bracketed IPv6 literal.
fn split_host_port(authority: &str) -> (&str, Option<&str>) {
    if let Some(bracketed) = authority.strip_prefix('[') {
        if let Some((address, rest)) = bracketed.split_once(']') {
            return (address, rest.strip_prefix(':').map(str::trim));
        }
    }
    match authority.split_once(':') {
        Some((host, port)) => (host, Some(port.trim())),
        None => (authority, None),
    }
}

fn parse_port(token: &str) -> Option<u16> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(raw: &str) -> ResolvedTarget {
        RequestHead::parse(raw.as_bytes()).resolve()
    }

    #[test]
    fn host_header_with_port_short_circuits() {
        let target = resolve("GET / HTTP/1.1\r\nHost: example.com:8080\r\n\r\n");
        assert_eq!(target, ResolvedTarget::new(Some("example.com".into()), 8080));
    }

    #[test]
    fn host_header_is_case_insensitive() {
        let target = resolve("GET / HTTP/1.1\r\nhOsT:   example.com:81  \r\n\r\n");
        assert_eq!(target, ResolvedTarget::new(Some("example.com".into()), 81));
    }

    #[test]
    fn host_header_without_port_defaults_to_80() {
        let target = resolve("GET / HTTP/1.1\r\nHost: example.com\r\n\r\n");
        assert_eq!(target, ResolvedTarget::new(Some("example.com".into()), 80));
    }

    #[test]
    fn host_header_without_port_falls_through_to_request_line() {
        // The Host header names the host, the request line supplies the port.
        let target = resolve("GET http://other.org:9000/ HTTP/1.1\r\nHost: example.com\r\n\r\n");
        assert_eq!(target, ResolvedTarget::new(Some("example.com".into()), 9000));
    }

    #[test]
    fn host_header_with_bad_port_falls_through() {
        let target = resolve("GET / HTTP/1.1\r\nHost: example.com:http\r\n\r\n");
        assert_eq!(target, ResolvedTarget::new(Some("example.com".into()), 80));
    }

    #[test]
    fn connect_without_host_header_uses_authority() {
        let target = resolve("CONNECT example.com:443 HTTP/1.1\r\n\r\n");
        assert_eq!(target, ResolvedTarget::new(Some("example.com".into()), 443));
    }

    #[test]
    fn https_without_port_uses_legacy_403() {
        let target = resolve("GET https://secure.example.com/index.html HTTP/1.1\r\n\r\n");
        assert_eq!(target.port, LEGACY_HTTPS_PORT);
        assert_eq!(target.port, 403);
        assert_eq!(target.host.as_deref(), Some("secure.example.com"));
    }

    #[test]
    fn absolute_uri_port_before_path() {
        let target = resolve("GET http://example.com:8081/a/b HTTP/1.1\r\n\r\n");
        assert_eq!(target, ResolvedTarget::new(Some("example.com".into()), 8081));
    }

    #[test]
    fn origin_form_without_host_is_unresolved() {
        let target = resolve("GET /index.html HTTP/1.1\r\nAccept: */*\r\n\r\n");
        assert_eq!(target, ResolvedTarget::new(None, 80));
    }

    #[test]
    fn blank_request_still_yields_a_port() {
        assert_eq!(resolve(""), ResolvedTarget::new(None, 80));
        assert_eq!(resolve("\r\n"), ResolvedTarget::new(None, 80));
    }

    #[test]
    fn out_of_range_port_is_ignored() {
        let target = resolve("CONNECT example.com:70000 HTTP/1.1\r\n\r\n");
        assert_eq!(target.port, 80);
    }

    #[test]
    fn first_host_header_wins() {
        let target = resolve("GET / HTTP/1.1\r\nHost: a.test:1\r\nHost: b.test:2\r\n\r\n");
        assert_eq!(target, ResolvedTarget::new(Some("a.test".into()), 1));
    }

    #[test]
    fn resolve_target_accepts_owned_lines() {
        let lines = vec![
            "CONNECT example.com:443 HTTP/1.1".to_string(),
            "Host: example.com:443".to_string(),
        ];
        assert_eq!(
            resolve_target(&lines),
            ResolvedTarget::new(Some("example.com".into()), 443)
        );
    }

    #[test]
    fn classifies_connect_by_method() {
        assert!(RequestHead::parse(b"CONNECT a:1 HTTP/1.1\r\n\r\n").is_connect());
        assert!(RequestHead::parse(b"connect a:1 HTTP/1.1\r\n\r\n").is_connect());
        assert!(!RequestHead::parse(b"GET /connect HTTP/1.1\r\n\r\n").is_connect());
    }

    #[test]
    fn summary_drops_protocol_version() {
        let head = RequestHead::parse(b"GET http://example.com/ HTTP/1.1\r\n\r\n");
        assert_eq!(head.summary(), "GET http://example.com/");
    }

    #[test]
    fn display_marks_unresolved_host() {
        assert_eq!(ResolvedTarget::new(Some("h".into()), 1).to_string(), "h:1");
        assert_eq!(ResolvedTarget::new(None, 80).to_string(), "<unresolved>:80");
        assert_eq!(ResolvedTarget::new(Some("::1".into()), 443).to_string(), "[::1]:443");
    }

    #[test]
    fn colon_in_query_is_not_a_port() {
        let target = resolve("GET /search?t=12:30 HTTP/1.1\r\nHost: example.com\r\n\r\n");
        assert_eq!(target, ResolvedTarget::new(Some("example.com".into()), 80));
    }

    #[test]
    fn colon_in_absolute_uri_path_is_not_a_port() {
        let target = resolve("GET http://example.com/clock/10:45 HTTP/1.1\r\n\r\n");
        assert_eq!(target, ResolvedTarget::new(Some("example.com".into()), 80));
    }

    #[test]
    fn bare_trailing_port_still_counts() {
        // No protocol version: everything after the colon is the port.
        let target = resolve("GET example.com:8000\r\n\r\n");
        assert_eq!(target, ResolvedTarget::new(Some("example.com".into()), 8000));
    }

    #[test]
    fn bracketed_ipv6_literals() {
        let target = resolve("CONNECT [::1]:443 HTTP/1.1\r\n\r\n");
        assert_eq!(target, ResolvedTarget::new(Some("::1".into()), 443));

        let target = resolve("GET / HTTP/1.1\r\nHost: [::1]:8080\r\n\r\n");
        assert_eq!(target, ResolvedTarget::new(Some("::1".into()), 8080));

        let target = resolve("GET / HTTP/1.1\r\nHost: [fe80::1]\r\n\r\n");
        assert_eq!(target, ResolvedTarget::new(Some("fe80::1".into()), 80));
    }

    #[test]
    fn body_lines_are_not_headers() {
        let target = resolve("POST /submit HTTP/1.1\r\nContent-Length: 12\r\n\r\nhost: evil:1");
        assert_eq!(target, ResolvedTarget::new(None, 80));

        let target = resolve("POST /submit HTTP/1.1\r\nHost: good.test\r\n\r\nhost: evil:1");
        assert_eq!(target, ResolvedTarget::new(Some("good.test".into()), 80));
    }
}

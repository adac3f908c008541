//! Plain-HTTP forwarding, end to end.

use forward_proxy::config::ProxyConfig;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

mod common;

const RESPONSE: &[u8] = b"HTTP/1.0 200 OK\r\nContent-Length: 2\r\n\r\nok";

#[tokio::test]
async fn request_is_downgraded_and_response_relayed() {
    let (upstream, mut captured) = common::start_capture_upstream(RESPONSE.to_vec()).await;
    let proxy = common::start_proxy(ProxyConfig::default()).await;

    let mut client = TcpStream::connect(proxy.local_addr()).await.unwrap();
    let request = format!(
        "GET / HTTP/1.1\r\nHost: 127.0.0.1:{}\r\nConnection: keep-alive\r\n\r\n",
        upstream.port()
    );
    client.write_all(request.as_bytes()).await.unwrap();

    let response = common::read_all(&mut client).await;
    assert_eq!(response, RESPONSE);

    let forwarded = String::from_utf8(captured.recv().await.unwrap()).unwrap();
    assert_eq!(
        forwarded,
        format!(
            "GET / HTTP/1.0\r\nHost: 127.0.0.1:{}\r\nConnection: close\r\n\r\n",
            upstream.port()
        )
    );
    assert!(!forwarded.contains("HTTP/1.1"));
    assert!(!forwarded.contains("keep-alive"));

    proxy.shutdown().await;
}

#[tokio::test]
async fn absolute_uri_without_host_header() {
    let (upstream, mut captured) = common::start_capture_upstream(RESPONSE.to_vec()).await;
    let proxy = common::start_proxy(ProxyConfig::default()).await;

    let mut client = TcpStream::connect(proxy.local_addr()).await.unwrap();
    let request = format!("GET http://127.0.0.1:{}/status HTTP/1.1\r\n\r\n", upstream.port());
    client.write_all(request.as_bytes()).await.unwrap();

    assert_eq!(common::read_all(&mut client).await, RESPONSE);
    let forwarded = captured.recv().await.unwrap();
    assert!(forwarded.starts_with(b"GET http://127.0.0.1:"));
    assert!(forwarded.ends_with(b"/status HTTP/1.0\r\n\r\n"));

    proxy.shutdown().await;
}

#[tokio::test]
async fn large_response_arrives_intact() {
    let mut response = b"HTTP/1.0 200 OK\r\n\r\n".to_vec();
    response.extend((0..20_000u32).map(|i| (i % 253) as u8));
    let (upstream, _captured) = common::start_capture_upstream(response.clone()).await;
    let proxy = common::start_proxy(ProxyConfig::default()).await;

    let mut client = TcpStream::connect(proxy.local_addr()).await.unwrap();
    let request = format!("GET / HTTP/1.1\r\nHost: 127.0.0.1:{}\r\n\r\n", upstream.port());
    client.write_all(request.as_bytes()).await.unwrap();

    assert_eq!(common::read_all(&mut client).await, response);

    proxy.shutdown().await;
}

#[tokio::test]
async fn unreachable_upstream_aborts_only_that_session() {
    let port = common::closed_port().await;
    let proxy = common::start_proxy(ProxyConfig::default()).await;

    let mut client = TcpStream::connect(proxy.local_addr()).await.unwrap();
    let request = format!("GET / HTTP/1.1\r\nHost: 127.0.0.1:{}\r\n\r\n", port);
    client.write_all(request.as_bytes()).await.unwrap();
    assert!(common::read_all(&mut client).await.is_empty());

    // The proxy keeps serving.
    let (upstream, _captured) = common::start_capture_upstream(RESPONSE.to_vec()).await;
    let mut client = TcpStream::connect(proxy.local_addr()).await.unwrap();
    let request = format!("GET / HTTP/1.1\r\nHost: 127.0.0.1:{}\r\n\r\n", upstream.port());
    client.write_all(request.as_bytes()).await.unwrap();
    assert_eq!(common::read_all(&mut client).await, RESPONSE);

    proxy.shutdown().await;
}

#[tokio::test]
async fn silent_client_is_dropped() {
    let proxy = common::start_proxy(ProxyConfig::default()).await;

    let mut client = TcpStream::connect(proxy.local_addr()).await.unwrap();
    client.shutdown().await.unwrap();
    assert!(common::read_all(&mut client).await.is_empty());

    proxy.shutdown().await;
}

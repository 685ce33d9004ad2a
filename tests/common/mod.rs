//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

use caching_proxy::{CacheStore, HttpServer, ProxyConfig, Shutdown};

/// A raw-TCP origin that records every request it receives.
pub struct MockOrigin {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockOrigin {
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).unwrap()
    }

    /// Number of requests the origin has received.
    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Raw requests (head and body), in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a programmable origin on an ephemeral port.
///
/// `respond` receives the raw request and returns the raw bytes to write
/// back before the connection is closed.
pub async fn start_origin<F>(respond: F) -> MockOrigin
where
    F: Fn(&str) -> Vec<u8> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    serve_origin(listener, respond)
}

/// Start a programmable origin on a specific address.
pub async fn start_origin_on<F>(addr: SocketAddr, respond: F) -> MockOrigin
where
    F: Fn(&str) -> Vec<u8> + Send + Sync + 'static,
{
    let listener = TcpListener::bind(addr).await.unwrap();
    serve_origin(listener, respond)
}

fn serve_origin<F>(listener: TcpListener, respond: F) -> MockOrigin
where
    F: Fn(&str) -> Vec<u8> + Send + Sync + 'static,
{
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let respond = Arc::new(respond);

    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let respond = respond.clone();
            let recorded = recorded.clone();
            tokio::spawn(async move {
                let Some(request) = read_request(&mut socket).await else {
                    return;
                };
                recorded.lock().unwrap().push(request.clone());
                let response = respond(&request);
                let _ = socket.write_all(&response).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    MockOrigin { addr, requests }
}

/// Read a request head plus any `Content-Length` body.
async fn read_request(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let head_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let body_len = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < head_end + body_len {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(String::from_utf8_lossy(&buf).to_string())
}

/// A complete `Content-Length` response with a fixed `Date` header.
///
/// Always sends `Connection: close` so upstream connections are not reused.
pub fn http_response(status_line: &str, extra_headers: &[(&str, &str)], body: &str) -> Vec<u8> {
    let mut out = format!(
        "HTTP/1.1 {}\r\nDate: Mon, 01 Jan 2024 00:00:00 GMT\r\nConnection: close\r\nContent-Length: {}\r\n",
        status_line,
        body.len()
    );
    for (name, value) in extra_headers {
        out.push_str(&format!("{}: {}\r\n", name, value));
    }
    out.push_str("\r\n");
    out.push_str(body);
    out.into_bytes()
}

/// A running proxy in front of an origin.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub cache: CacheStore,
    shutdown: Shutdown,
}

impl TestProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Wait until the cache holds `count` entries (the cache write lands
    /// just after the last body byte is relayed).
    pub async fn wait_for_entries(&self, count: usize) {
        for _ in 0..100 {
            if self.cache.len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("cache never reached {} entries (has {})", count, self.cache.len());
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a proxy on an ephemeral port.
pub async fn start_proxy(origin: Url) -> TestProxy {
    let cache = CacheStore::new();
    let server = HttpServer::new(ProxyConfig::new(8080, origin), cache.clone()).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    TestProxy {
        addr,
        cache,
        shutdown,
    }
}

/// Client that never pools connections or uses environment proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

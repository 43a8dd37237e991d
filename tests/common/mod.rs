//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;

use forwarding_gateway::config::GatewayConfig;
use forwarding_gateway::{HttpServer, Shutdown};

/// One request as seen by the spy upstream.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Response the spy upstream serves for every request.
#[derive(Debug, Clone)]
pub struct Canned {
    pub status: u16,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: Vec<u8>,
}

impl Canned {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: vec![("content-type", "application/json")],
            body: body.as_bytes().to_vec(),
        }
    }
}

/// A recording upstream bound to an ephemeral port.
#[derive(Clone)]
pub struct SpyUpstream {
    pub addr: SocketAddr,
    captured: Arc<Mutex<Vec<Captured>>>,
}

impl SpyUpstream {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn hits(&self) -> usize {
        self.captured.lock().unwrap().len()
    }

    pub fn last(&self) -> Captured {
        self.captured
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("spy upstream received no requests")
    }
}

/// Start a spy upstream that records requests and serves `canned`.
pub async fn start_spy_upstream(canned: Canned) -> SpyUpstream {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = captured.clone();

    let app = Router::new().fallback(move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| {
        let sink = sink.clone();
        let canned = canned.clone();
        async move {
            sink.lock().unwrap().push(Captured { method, uri, headers, body });

            let mut response: Response = canned.body.into_response();
            *response.status_mut() = StatusCode::from_u16(canned.status).unwrap();
            response.headers_mut().remove("content-type");
            for (name, value) in canned.headers {
                response.headers_mut().insert(name, value.parse().unwrap());
            }
            response
        }
    })
    .layer(DefaultBodyLimit::disable());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    SpyUpstream { addr, captured }
}

/// Start an upstream that accepts requests but answers only after `delay`.
pub async fn start_stalled_upstream(delay: Duration) -> SpyUpstream {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = captured.clone();

    let app = Router::new().fallback(move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| {
        let sink = sink.clone();
        async move {
            sink.lock().unwrap().push(Captured { method, uri, headers, body });
            tokio::time::sleep(delay).await;
            StatusCode::OK
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    SpyUpstream { addr, captured }
}

/// An address with nothing listening on it.
pub fn closed_port() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Gateway config suitable for tests: no env proxies, short timeouts.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.upstream.use_env_proxy = false;
    config.upstream.timeout_secs = 5;
    config.timeouts.request_secs = 10;
    config
}

/// A running gateway and the handle that stops it.
pub struct RunningGateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl RunningGateway {
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }
}

impl Drop for RunningGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the gateway on an ephemeral port.
pub async fn start_gateway(config: GatewayConfig) -> RunningGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config).unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    RunningGateway { addr, shutdown }
}

/// Caller-side client that ignores environment proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(15))
        .build()
        .unwrap()
}

/// Percent-encode a query value.
pub fn enc(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

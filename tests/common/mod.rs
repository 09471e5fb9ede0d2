//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use restaurant_api::catalog::{self, Catalog};
use restaurant_api::config::AppConfig;
use restaurant_api::http::{build_router, HttpServer};
use restaurant_api::lifecycle::Shutdown;
use restaurant_api::pipeline::Pipeline;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceExt;
use tracing::subscriber::DefaultGuard;

pub const SECURITY_HEADERS: [(&str, &str); 6] = [
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
    ("x-content-type-options", "nosniff"),
    (
        "content-security-policy",
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data: https:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'",
    ),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    (
        "permissions-policy",
        "geolocation=(), microphone=(), camera=(), payment=(), usb=()",
    ),
];

pub fn config_with_keys(keys: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.api_key.enabled = true;
    config.api_key.keys = keys.to_string();
    config.api_key.public_paths = vec![
        "/api/restaurants/health".to_string(),
        "/actuator/health".to_string(),
    ];
    config
}

/// The full application router, with optional extra routes merged in.
pub fn app_with(config: &AppConfig, extra: Router) -> Router {
    let catalog = Arc::new(Catalog::bundled().unwrap());
    build_router(
        Arc::new(Pipeline::from_config(config)),
        catalog::routes(catalog).merge(extra),
        config.security.max_body_size,
    )
}

pub fn app(config: &AppConfig) -> Router {
    app_with(config, Router::new())
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn assert_security_headers(&self) {
        for (name, value) in SECURITY_HEADERS {
            assert_eq!(
                self.headers.get(name).and_then(|v| v.to_str().ok()),
                Some(value),
                "header {name} on a {} response",
                self.status
            );
        }
    }
}

pub struct TestRequest<'a> {
    pub method: Method,
    pub path: &'a str,
    pub client: &'a str,
    pub api_key: Option<&'a str>,
    pub body: Option<&'a str>,
}

impl<'a> TestRequest<'a> {
    pub fn get(path: &'a str) -> Self {
        Self {
            method: Method::GET,
            path,
            client: "203.0.113.10",
            api_key: None,
            body: None,
        }
    }

    pub fn post(path: &'a str, body: &'a str) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::get(path)
        }
    }

    pub fn from_client(mut self, client: &'a str) -> Self {
        self.client = client;
        self
    }

    pub fn with_key(mut self, key: &'a str) -> Self {
        self.api_key = Some(key);
        self
    }
}

pub async fn send(app: &Router, req: TestRequest<'_>) -> TestResponse {
    let mut builder = Request::builder()
        .method(req.method)
        .uri(req.path)
        .header("x-forwarded-for", req.client);
    if let Some(key) = req.api_key {
        builder = builder.header("x-api-key", key);
    }
    let body = match req.body {
        Some(body) => {
            builder = builder.header("content-type", "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();
    TestResponse {
        status,
        headers,
        body,
    }
}

/// Start a real server on an ephemeral port.
pub async fn start_server(
    config: AppConfig,
) -> (SocketAddr, Shutdown, JoinHandle<Result<(), std::io::Error>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, Catalog::bundled().unwrap());
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));
    (addr, shutdown, handle)
}

/// Formatted log output captured from the current thread.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

/// Route this thread's log events into a buffer until the guard drops.
/// Only valid with the current-thread test runtime.
pub fn capture_logs() -> (LogBuffer, DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();
    (buffer, tracing::subscriber::set_default(subscriber))
}

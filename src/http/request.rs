//! Request identification and metadata.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every request
//! - Extract the pipeline-relevant facts (method, path, caller, API key)
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Metadata is copied out once so the request body can move on untouched

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::{HeaderValue, Method, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::security::{ClientKey, X_API_KEY};

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates `x-request-id` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestUuid;

impl MakeRequestId for RequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// What the pipeline needs to know about a request.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub request_id: String,
    pub method: Method,
    pub path: String,
    pub client_key: ClientKey,
    /// Raw `X-API-Key` header, if sent. Non-UTF-8 bytes are replaced so a
    /// garbled key is reported as invalid rather than missing.
    pub api_key: Option<String>,
}

impl RequestMeta {
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let headers = request.headers();
        let remote = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Self {
            request_id: headers
                .get(X_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown")
                .to_string(),
            method: request.method().clone(),
            path: request.uri().path().to_string(),
            client_key: ClientKey::resolve(headers, remote),
            api_key: headers
                .get(X_API_KEY)
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned()),
        }
    }
}

//! Caller identity used to partition rate-limit state.
//!
//! Proxy headers are trusted as-is: there is no trusted-proxy list, so a
//! caller that can set `X-Forwarded-For` chooses its own bucket.

use std::fmt;
use std::net::SocketAddr;

use axum::http::HeaderMap;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_REAL_IP: &str = "x-real-ip";

/// Stable per-caller identity string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey(String);

impl ClientKey {
    /// Derive the key from, in order: the first `X-Forwarded-For` entry,
    /// `X-Real-IP`, the connection address.
    pub fn resolve(headers: &HeaderMap, remote: Option<SocketAddr>) -> Self {
        if let Some(first) = header_str(headers, X_FORWARDED_FOR)
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
        {
            return Self(first.to_string());
        }

        if let Some(real_ip) = header_str(headers, X_REAL_IP) {
            return Self(real_ip.to_string());
        }

        Self(
            remote
                .map(|addr| addr.ip().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

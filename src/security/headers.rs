//! Security response headers.
//!
//! # Responsibilities
//! - Stamp the fixed hardening header set on every outgoing response
//! - Optionally add Strict-Transport-Security
//!
//! # Design Decisions
//! - Values are static; the set is built once at startup
//! - Existing values are overwritten, so a handler cannot weaken them
//! - No per-request branching: status and origin of the response are ignored

use axum::http::{header, HeaderName, HeaderValue};
use axum::response::Response;

use crate::config::SecurityConfig;

pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; script-src 'self'; \
style-src 'self' 'unsafe-inline'; img-src 'self' data: https:; font-src 'self'; \
connect-src 'self'; frame-ancestors 'none'";

pub const PERMISSIONS_POLICY: &str =
    "geolocation=(), microphone=(), camera=(), payment=(), usb=()";

pub const STRICT_TRANSPORT_SECURITY: &str = "max-age=31536000; includeSubDomains";

const PERMISSIONS_POLICY_HEADER: HeaderName = HeaderName::from_static("permissions-policy");

/// The six headers every response carries.
pub const FIXED_HEADERS: [(HeaderName, &str); 6] = [
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::X_XSS_PROTECTION, "1; mode=block"),
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY),
    (header::REFERRER_POLICY, "strict-origin-when-cross-origin"),
    (PERMISSIONS_POLICY_HEADER, PERMISSIONS_POLICY),
];

/// Applies the header set to responses.
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl SecurityHeaders {
    pub fn new(hsts_enabled: bool) -> Self {
        let mut headers: Vec<(HeaderName, HeaderValue)> = FIXED_HEADERS
            .into_iter()
            .map(|(name, value)| (name, HeaderValue::from_static(value)))
            .collect();

        if hsts_enabled {
            headers.push((
                header::STRICT_TRANSPORT_SECURITY,
                HeaderValue::from_static(STRICT_TRANSPORT_SECURITY),
            ));
        }

        Self { headers }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(config.hsts_enabled)
    }

    pub fn decorate(&self, mut response: Response) -> Response {
        let target = response.headers_mut();
        for (name, value) in &self.headers {
            target.insert(name.clone(), value.clone());
        }
        response
    }
}

impl Default for SecurityHeaders {
    fn default() -> Self {
        Self::new(false)
    }
}

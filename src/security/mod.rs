//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → client_key.rs (derive caller identity, proxy-aware)
//!     → auth.rs (optional X-API-Key gate, public path allow-list)
//!     → rate_limit.rs (per-client token bucket)
//!     → Pass to the catalog handlers
//!
//! Outgoing response (every path, success or rejection):
//!     → headers.rs (fixed hardening header set)
//! ```
//!
//! # Design Decisions
//! - Authentication runs before rate limiting, so rejected callers never
//!   spend quota
//! - Fail closed: reject on any gate failure
//! - Gate state is built once at startup and shared by reference

pub mod auth;
pub mod client_key;
pub mod headers;
pub mod rate_limit;

pub use auth::{AuthFailure, Authenticator, KeySet, PublicPathSet, X_API_KEY};
pub use client_key::ClientKey;
pub use headers::SecurityHeaders;
pub use rate_limit::{Admission, RateLimiter, TokenBucket};

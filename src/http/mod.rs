//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (trace, request ID, pipeline middleware, body limit)
//!     → request.rs (request ID generation, RequestMeta extraction)
//!     → catalog handlers
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{RequestMeta, RequestUuid, X_REQUEST_ID};
pub use server::{build_router, HttpServer};

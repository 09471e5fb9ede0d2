//! Restaurant inspection API library.

// Business handler
pub mod catalog;

// Core subsystems
pub mod config;
pub mod error;
pub mod http;
pub mod pipeline;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use catalog::Catalog;
pub use config::schema::AppConfig;
pub use error::{ApiError, ErrorEnvelope};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pipeline::Pipeline;

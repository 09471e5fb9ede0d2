//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters, gauges, histograms)
//!     → audit.rs (one start and one completion event per dispatched request)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields, never interpolated strings, for machine parsing
//! - Request ID flows through every audit event
//! - Metric calls are no-ops until a recorder is installed

pub mod audit;
pub mod logging;
pub mod metrics;

pub use audit::RequestAuditLogger;

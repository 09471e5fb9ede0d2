//! Restaurant inspection catalog: the business handler behind the pipeline.
//!
//! # Data Flow
//! ```text
//! JSON body → validation (field rules, then sanitize + screen)
//!           → Catalog query over the in-memory dataset
//!           → JSON response
//! ```
//!
//! Failures are returned as `ApiError` values and rendered by the
//! pipeline's error translator.

pub mod handlers;
pub mod model;
pub mod service;
pub mod validation;

pub use handlers::{method_not_allowed, not_found, routes};
pub use model::{DetailsQuery, DetailsRequest, Inspection, SearchQuery, SearchRequest};
pub use service::Catalog;

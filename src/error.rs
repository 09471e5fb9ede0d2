//! Failure taxonomy and translation to client-facing responses.
//!
//! # Data Flow
//! ```text
//! gate failure (auth, rate limit)
//!     → GateRejection → fixed JSON body, inner handler never runs
//!
//! handler failure
//!     → ApiError::into_response (status + HandlerFailure extension)
//!     → ErrorTranslator::resolve (in the pipeline, knows the path)
//!     → ErrorEnvelope JSON
//! ```
//!
//! # Design Decisions
//! - Expected failures (validation, business rules) are values, not panics
//! - Unclassified failures are logged in full and rendered with a fixed
//!   generic message; their text never reaches the response body

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::json;
use thiserror::Error;

use crate::security::AuthFailure;

pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";
pub const VALIDATION_ERROR_MESSAGE: &str = "Invalid request parameters";
pub const API_KEY_HINT: &str = "Include X-API-Key header in your request";
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests. Please try again later.";

/// One invalid request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Failures raised by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed for {} field(s)", .0.len())]
    ValidationFailed(Vec<FieldError>),

    #[error("{0}")]
    BusinessRuleViolation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Method {method} is not supported for {path}")]
    MethodNotAllowed { method: String, path: String },

    #[error(transparent)]
    Unclassified(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ValidationFailed(_) | ApiError::BusinessRuleViolation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Unclassified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApiError::ValidationFailed(_) => "Validation Failed",
            ApiError::BusinessRuleViolation(_) => "Bad Request",
            ApiError::NotFound(_) => "Not Found",
            ApiError::MethodNotAllowed { .. } => "Method Not Allowed",
            ApiError::Unclassified(_) => "Internal Server Error",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BusinessRuleViolation(rejection.body_text())
    }
}

/// Marker carried in response extensions so the pipeline can translate a
/// handler failure once the request path is known.
#[derive(Debug, Clone)]
pub struct HandlerFailure(pub Arc<ApiError>);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = self.status().into_response();
        response
            .extensions_mut()
            .insert(HandlerFailure(Arc::new(self)));
        response
    }
}

/// The uniform JSON error body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "status")]
    pub http_status: u16,
    #[serde(rename = "error")]
    pub error_label: String,
    pub message: String,
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&ts.format("%Y-%m-%dT%H:%M:%S"))
}

/// Maps handler failures to envelopes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorTranslator;

impl ErrorTranslator {
    pub fn translate(&self, failure: &ApiError, path: &str) -> ErrorEnvelope {
        let (message, field_errors) = match failure {
            ApiError::ValidationFailed(fields) => {
                tracing::warn!(path = %path, fields = fields.len(), "Validation error");
                (VALIDATION_ERROR_MESSAGE.to_string(), fields.clone())
            }
            ApiError::BusinessRuleViolation(message) => {
                tracing::warn!(path = %path, message = %message, "Illegal argument");
                (message.clone(), Vec::new())
            }
            ApiError::NotFound(resource) => {
                tracing::debug!(path = %path, resource = %resource, "Resource not found");
                (failure.to_string(), Vec::new())
            }
            ApiError::MethodNotAllowed { method, .. } => {
                tracing::warn!(path = %path, method = %method, "Method not allowed");
                (failure.to_string(), Vec::new())
            }
            ApiError::Unclassified(error) => {
                tracing::error!(path = %path, error = ?error, "Unexpected error occurred");
                (GENERIC_ERROR_MESSAGE.to_string(), Vec::new())
            }
        };

        ErrorEnvelope {
            timestamp: Utc::now(),
            http_status: failure.status().as_u16(),
            error_label: failure.label().to_string(),
            message,
            path: path.to_string(),
            field_errors,
        }
    }

    pub fn render(&self, failure: &ApiError, path: &str) -> Response {
        (failure.status(), Json(self.translate(failure, path))).into_response()
    }

    /// Replace a response produced from an [`ApiError`] with its envelope.
    /// Any other response passes through untouched.
    pub fn resolve(&self, mut response: Response, path: &str) -> Response {
        match response.extensions_mut().remove::<HandlerFailure>() {
            Some(HandlerFailure(failure)) => self.render(&failure, path),
            None => response,
        }
    }
}

/// Failures raised by the pipeline gates before any handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateRejection {
    #[error("Rate limit exceeded")]
    RateLimitExceeded { retry_after_secs: u64 },

    #[error("API key is required")]
    AuthenticationMissing,

    #[error("Invalid API key")]
    AuthenticationInvalid,
}

impl From<AuthFailure> for GateRejection {
    fn from(failure: AuthFailure) -> Self {
        match failure {
            AuthFailure::Missing => GateRejection::AuthenticationMissing,
            AuthFailure::Invalid => GateRejection::AuthenticationInvalid,
        }
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        match self {
            GateRejection::RateLimitExceeded { retry_after_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                Json(json!({
                    "error": "Rate limit exceeded",
                    "message": RATE_LIMIT_MESSAGE,
                    "retryAfter": retry_after_secs,
                })),
            )
                .into_response(),
            GateRejection::AuthenticationMissing | GateRejection::AuthenticationInvalid => (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "Unauthorized",
                    "message": self.to_string(),
                    "hint": API_KEY_HINT,
                })),
            )
                .into_response(),
        }
    }
}

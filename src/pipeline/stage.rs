//! Pipeline states and the ordered gate list.

use std::fmt;

use crate::error::GateRejection;
use crate::http::RequestMeta;
use crate::observability::metrics;
use crate::pipeline::runner::Pipeline;
use crate::security::Admission;

/// Where a request is in the pipeline. Transitions are strictly linear;
/// any gate may jump straight to `Responding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Authenticating,
    RateLimiting,
    Dispatched,
    Responding,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Authenticating => "authenticating",
            PipelineState::RateLimiting => "rate_limiting",
            PipelineState::Dispatched => "dispatched",
            PipelineState::Responding => "responding",
        };
        f.write_str(name)
    }
}

pub type GateCheck = fn(&Pipeline, &RequestMeta) -> Result<(), GateRejection>;

/// A check that can reject a request before it reaches the handler.
#[derive(Clone, Copy)]
pub struct Gate {
    pub state: PipelineState,
    pub check: GateCheck,
}

/// Gates in execution order. Authentication comes first so a rejected
/// caller never spends a rate-limit token.
pub const GATES: [Gate; 2] = [
    Gate {
        state: PipelineState::Authenticating,
        check: authenticate,
    },
    Gate {
        state: PipelineState::RateLimiting,
        check: rate_limit,
    },
];

fn authenticate(pipeline: &Pipeline, meta: &RequestMeta) -> Result<(), GateRejection> {
    pipeline
        .authenticator()
        .authenticate(&meta.path, meta.api_key.as_deref())
        .map_err(|failure| {
            tracing::warn!(
                request_id = %meta.request_id,
                path = %meta.path,
                client = %meta.client_key,
                reason = failure.reason(),
                "API key rejected"
            );
            metrics::record_auth_rejected(failure.reason());
            GateRejection::from(failure)
        })
}

fn rate_limit(pipeline: &Pipeline, meta: &RequestMeta) -> Result<(), GateRejection> {
    match pipeline.rate_limiter().admit(&meta.client_key) {
        Admission::Allowed => Ok(()),
        Admission::Rejected { retry_after_secs } => {
            tracing::warn!(
                request_id = %meta.request_id,
                client = %meta.client_key,
                retry_after_secs,
                "Rate limit exceeded"
            );
            metrics::record_rate_limited("window_exhausted");
            Err(GateRejection::RateLimitExceeded { retry_after_secs })
        }
    }
}

//! Composition of the request pipeline.

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::config::AppConfig;
use crate::error::{ErrorTranslator, GateRejection};
use crate::http::RequestMeta;
use crate::observability::RequestAuditLogger;
use crate::pipeline::stage::{PipelineState, GATES};
use crate::security::{Authenticator, RateLimiter, SecurityHeaders};

/// Every stage's state, built once at startup and shared by reference.
pub struct Pipeline {
    authenticator: Authenticator,
    rate_limiter: Arc<RateLimiter>,
    audit: RequestAuditLogger,
    translator: ErrorTranslator,
    headers: SecurityHeaders,
}

impl Pipeline {
    pub fn new(
        authenticator: Authenticator,
        rate_limiter: Arc<RateLimiter>,
        headers: SecurityHeaders,
    ) -> Self {
        Self {
            authenticator,
            rate_limiter,
            audit: RequestAuditLogger,
            translator: ErrorTranslator,
            headers,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Authenticator::from_config(&config.api_key),
            Arc::new(RateLimiter::from_config(&config.rate_limit)),
            SecurityHeaders::from_config(&config.security),
        )
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    /// Run every gate in order, stopping at the first rejection.
    pub fn check_gates(&self, meta: &RequestMeta) -> Result<(), GateRejection> {
        for gate in GATES.iter() {
            tracing::trace!(request_id = %meta.request_id, state = %gate.state, "Pipeline state");
            (gate.check)(self, meta)?;
        }
        Ok(())
    }

    /// Process one request. `inner` is the business handler; it is only
    /// invoked if every gate admits the request. Whatever happens, the
    /// returned response carries the security header set.
    pub async fn process<F, Fut>(&self, request: Request<Body>, inner: F) -> Response
    where
        F: FnOnce(Request<Body>) -> Fut,
        Fut: Future<Output = Response>,
    {
        let meta = RequestMeta::from_request(&request);

        let response = match self.check_gates(&meta) {
            Err(rejection) => rejection.into_response(),
            Ok(()) => {
                tracing::trace!(
                    request_id = %meta.request_id,
                    state = %PipelineState::Dispatched,
                    "Pipeline state"
                );
                let translator = self.translator;
                let path = meta.path.as_str();
                self.audit
                    .observe(&meta, async move { translator.resolve(inner(request).await, path) })
                    .await
            }
        };

        tracing::trace!(
            request_id = %meta.request_id,
            state = %PipelineState::Responding,
            status = response.status().as_u16(),
            "Pipeline state"
        );
        self.headers.decorate(response)
    }
}

/// Axum middleware entry point: the rest of the router is the inner handler.
pub async fn run_pipeline(
    State(pipeline): State<Arc<Pipeline>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    pipeline.process(request, |request| next.run(request)).await
}

//! Request/response audit logging.
//!
//! Wraps the rest of the chain: one "Incoming request" event before the
//! inner handler runs and one "Outgoing response" event after. The
//! completion event is emitted from a drop guard, so it is written even
//! when the inner future is cancelled or unwinds.

use std::future::Future;
use std::time::Instant;

use axum::http::StatusCode;
use axum::response::Response;

use crate::http::RequestMeta;
use crate::observability::metrics;

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestAuditLogger;

impl RequestAuditLogger {
    /// Run `inner`, logging around it. The response is returned unchanged.
    pub async fn observe<F>(&self, meta: &RequestMeta, inner: F) -> Response
    where
        F: Future<Output = Response>,
    {
        tracing::info!(
            request_id = %meta.request_id,
            method = %meta.method,
            path = %meta.path,
            client = %meta.client_key,
            "Incoming request"
        );

        let mut guard = CompletionGuard {
            meta,
            started: Instant::now(),
            status: None,
        };
        let response = inner.await;
        guard.status = Some(response.status());
        response
    }
}

struct CompletionGuard<'a> {
    meta: &'a RequestMeta,
    started: Instant,
    status: Option<StatusCode>,
}

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed();
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

        match self.status {
            Some(status) => {
                tracing::info!(
                    request_id = %self.meta.request_id,
                    method = %self.meta.method,
                    path = %self.meta.path,
                    status = status.as_u16(),
                    elapsed_ms,
                    "Outgoing response"
                );
                metrics::record_request(self.meta.method.as_str(), status.as_u16(), elapsed);
            }
            None => {
                tracing::warn!(
                    request_id = %self.meta.request_id,
                    method = %self.meta.method,
                    path = %self.meta.path,
                    elapsed_ms,
                    "Request ended before a response was produced"
                );
            }
        }
    }
}

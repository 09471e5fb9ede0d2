//! Metrics collection and exposition.
//!
//! # Metrics
//! - `api_requests_total` (counter): dispatched requests by method, status
//! - `api_request_duration_seconds` (histogram): handler latency by method
//! - `api_rate_limited_total` (counter): rate limit rejections
//! - `api_auth_rejected_total` (counter): API key rejections by reason
//! - `api_rate_limit_buckets` (gauge): clients currently tracked

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape listener. Must run inside the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, elapsed: Duration) {
    counter!(
        "api_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("api_request_duration_seconds", "method" => method.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_rate_limited(reason: &'static str) {
    counter!("api_rate_limited_total", "reason" => reason).increment(1);
}

pub fn record_auth_rejected(reason: &'static str) {
    counter!("api_auth_rejected_total", "reason" => reason).increment(1);
}

pub fn record_tracked_clients(count: usize) {
    gauge!("api_rate_limit_buckets").set(count as f64);
}

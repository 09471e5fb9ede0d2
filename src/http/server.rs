//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the catalog handlers
//! - Wire up middleware (tracing, request ID, pipeline, panics, body limit)
//! - Bind server to listener
//! - Run the rate-limit sweeper alongside the server
//! - Stop accepting and drain on shutdown

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::catalog::{self, Catalog};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::http::request::RequestUuid;
use crate::pipeline::{run_pipeline, Pipeline};

/// HTTP server for the restaurant API.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    pipeline: Arc<Pipeline>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig, catalog: Catalog) -> Self {
        let pipeline = Arc::new(Pipeline::from_config(&config));
        let router = build_router(
            pipeline.clone(),
            catalog::routes(Arc::new(catalog)),
            config.security.max_body_size,
        );
        Self {
            router,
            config,
            pipeline,
        }
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if self.config.rate_limit.enabled {
            let every = Duration::from_secs(self.config.rate_limit.sweep_interval_secs);
            let limiter = self.pipeline.rate_limiter().clone();
            tokio::spawn(limiter.run_sweeper(every, shutdown.resubscribe()));
        }

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Wrap `app` in the middleware stack. Layers listed first run first:
///
/// ```text
/// trace → set x-request-id → propagate x-request-id → pipeline
///       → catch panic → body limit → app (or 404/405 fallback)
/// ```
///
/// The panic guard sits inside the pipeline so a crashed handler still
/// comes back through error translation and header stamping.
pub fn build_router(pipeline: Arc<Pipeline>, app: Router, max_body_size: usize) -> Router {
    app.fallback(catalog::not_found)
        .method_not_allowed_fallback(catalog::method_not_allowed)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetRequestIdLayer::x_request_id(RequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(middleware::from_fn_with_state(pipeline, run_pipeline))
                .layer(CatchPanicLayer::custom(panic_response))
                .layer(DefaultBodyLimit::max(max_body_size)),
        )
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    ApiError::Unclassified(anyhow!("handler panicked: {detail}")).into_response()
}

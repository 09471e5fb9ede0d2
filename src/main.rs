//! Restaurant Inspection API
//!
//! A read-only HTTP API over restaurant inspection records, fronted by a
//! request-processing pipeline.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────────┐
//!                     │                    RESTAURANT API                         │
//!                     │                                                          │
//!   Client Request    │  ┌─────────┐   ┌──────────────┐   ┌──────────────┐       │
//!   ──────────────────┼─▶│  trace  │──▶│ request ID   │──▶│   pipeline   │       │
//!                     │  │ (layer) │   │ set/propagate│   │  gates:      │       │
//!                     │  └─────────┘   └──────────────┘   │  auth → rate │       │
//!                     │                                   └──────┬───────┘       │
//!                     │                                          │ admitted      │
//!                     │                                          ▼               │
//!                     │                                   ┌──────────────┐       │
//!                     │                                   │ audit logger │       │
//!                     │                                   │  + catalog   │       │
//!                     │                                   │   handlers   │       │
//!                     │                                   └──────┬───────┘       │
//!                     │                                          ▼               │
//!   Client Response   │  ┌──────────────────┐   ┌──────────────────────┐        │
//!   ◀─────────────────┼──│ security headers │◀──│   error translator   │        │
//!                     │  └──────────────────┘   └──────────────────────┘        │
//!                     │                                                          │
//!                     │  ┌────────────────────────────────────────────────────┐ │
//!                     │  │              Cross-Cutting Concerns                 │ │
//!                     │  │   config │ observability │ lifecycle │ sweeper     │ │
//!                     │  └────────────────────────────────────────────────────┘ │
//!                     └──────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use restaurant_api::catalog::Catalog;
use restaurant_api::config::load_config;
use restaurant_api::http::HttpServer;
use restaurant_api::lifecycle::{wait_for_shutdown_signal, Shutdown};
use restaurant_api::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "restaurant-api")]
#[command(about = "Restaurant inspection API server", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!("restaurant-api v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        rate_limit_capacity = config.rate_limit.capacity,
        rate_limit_window_secs = config.rate_limit.window_secs,
        api_key_enabled = config.api_key.enabled,
        hsts_enabled = config.security.hsts_enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?);
    }

    let catalog = Catalog::from_config(&config.catalog)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, catalog);
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let stopped_early = tokio::select! {
        _ = wait_for_shutdown_signal() => false,
        result = &mut server_task => {
            result??;
            true
        }
    };
    if !stopped_early {
        shutdown.trigger();
        server_task.await??;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

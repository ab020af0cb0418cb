//! Startup orchestration.
//!
//! # Order
//! - Connect the store and ensure its schema
//! - Start the metrics endpoint (optional)
//! - Bind the listener and begin accepting traffic
//!
//! Telemetry is installed by the entry point before any of this, so every
//! step is logged and traced.
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and returned, never panicked
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{AppConfig, ConfigError};
use crate::http::{AppState, HttpServer};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::spawn_signal_listener;
use crate::observability::metrics;
use crate::observability::TelemetryError;
use crate::store::PgProductRepository;

/// Failures that prevent the service from serving traffic.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("telemetry setup failed: {0}")]
    Telemetry(#[from] TelemetryError),

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("cannot connect to the store: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("schema migration failed: {0}")]
    Schema(#[source] sqlx::Error),

    #[error("cannot bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Connect PostgreSQL, ensure the schema, then serve until a signal.
pub async fn run(config: AppConfig) -> Result<(), StartupError> {
    let repository = PgProductRepository::connect(&config.database).await?;
    repository.ensure_schema().await?;

    serve(config, AppState::new(Arc::new(repository))).await
}

/// Serve `state` on the configured listener until a signal arrives.
pub async fn serve(config: AppConfig, state: AppState) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let address = config.listener.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    tracing::info!(
        address = %address,
        request_timeout_secs = config.timeouts.request_secs,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signals = spawn_signal_listener(shutdown);

    let result = HttpServer::new(&config, state)
        .run(listener, server_shutdown)
        .await
        .map_err(StartupError::Serve);

    signals.abort();
    result
}

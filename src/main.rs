//! Product API (v1)
//!
//! A read-only product listing service built with Tokio, Axum and sqlx,
//! traced end to end with OpenTelemetry.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌────────────────────────────────────────────────────┐
//!                     │                    PRODUCT API                      │
//!                     │                                                     │
//!   Client Request    │  ┌──────────┐   ┌───────────┐   ┌──────────────┐   │
//!   ──────────────────┼─▶│  router  │──▶│ handlers  │──▶│    store     │───┼──▶ PostgreSQL
//!                     │  │middleware│   │           │   │ (db.query    │   │
//!   ◀─────────────────┼──│  stack   │◀──│   JSON    │◀──│   spans)     │◀──┼───
//!   Client Response   │  └──────────┘   └───────────┘   └──────────────┘   │
//!                     │                                                     │
//!                     │  ┌───────────────────────────────────────────────┐ │
//!                     │  │ config │ observability │ lifecycle             │ │
//!                     │  └───────────────────────────────────────────────┘ │
//!                     └────────────────────────────────────────────────────┘
//!                                          │ spans
//!                                          ▼
//!                                 OTLP collector / stdout
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use product_api::config::{self, validate_config, ConfigError};
use product_api::error::{self, AppError};
use product_api::lifecycle::{startup, StartupError};
use product_api::observability;

#[derive(Parser)]
#[command(name = "product-api")]
#[command(version, about = "Traced product listing API", long_about = None)]
struct Cli {
    /// Path to a TOML config file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address (e.g. 127.0.0.1:8080).
    #[arg(short, long)]
    bind: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("product-api: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = config::load_or_default(cli.config.as_deref()).map_err(StartupError::from)?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        validate_config(&config)
            .map_err(|errors| StartupError::from(ConfigError::Validation(errors)))?;
    }

    let telemetry = observability::setup(&config.observability).map_err(StartupError::from)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        exporting_spans = telemetry.is_exporting(),
        "product-api starting"
    );

    // The runtime is dropped before telemetry shutdown so the final flush
    // runs outside the async context.
    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(StartupError::Runtime)
        .and_then(|runtime| runtime.block_on(startup::run(config)));

    match &result {
        Ok(()) => tracing::info!("Shutdown complete"),
        Err(err) => tracing::error!(error = %err, "product-api stopped with an error"),
    }

    error::join(result, telemetry.shutdown())
}

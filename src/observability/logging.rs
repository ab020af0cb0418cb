//! Structured logging.
//!
//! # Responsibilities
//! - Build the log filter (`RUST_LOG` first, config default otherwise)
//! - Build the human-readable output layer
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Log level configurable via config and environment

use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG`, falling back to `default_directives`.
pub fn env_filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

/// Console output layer.
pub fn fmt_layer<S>() -> tracing_subscriber::fmt::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer().with_target(true)
}

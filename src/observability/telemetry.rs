//! Telemetry bootstrap.
//!
//! Installs, once per process:
//! - the W3C trace-context propagator
//! - an OpenTelemetry tracer provider with a batch span exporter
//! - the `tracing` subscriber (filter, fmt output, OpenTelemetry bridge)
//!
//! [`setup`] hands back a [`TelemetryGuard`]; calling
//! [`TelemetryGuard::shutdown`] flushes buffered spans before exit.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::error::OTelSdkError;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ExporterKind, ObservabilityConfig};
use crate::observability::logging;

/// Telemetry setup and teardown failures.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("failed to build span exporter: {0}")]
    Exporter(#[from] opentelemetry_otlp::ExporterBuildError),

    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),

    #[error("telemetry shutdown failed: {0}")]
    Shutdown(#[from] OTelSdkError),
}

/// Owns the tracer provider until shutdown.
#[derive(Debug)]
#[must_use = "dropping the guard without calling shutdown loses buffered spans"]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl TelemetryGuard {
    /// Whether spans are being exported anywhere.
    pub fn is_exporting(&self) -> bool {
        self.provider.is_some()
    }

    /// Flush pending spans and release the exporter.
    ///
    /// Consumes the guard, so it can only run once. Must not be called from
    /// inside an async context: the flush blocks on the exporter thread.
    pub fn shutdown(self) -> Result<(), TelemetryError> {
        match self.provider {
            Some(provider) => {
                provider.shutdown()?;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// Build the tracer provider for the configured exporter.
///
/// Returns `None` when span export is disabled.
pub fn build_provider(
    config: &ObservabilityConfig,
) -> Result<Option<SdkTracerProvider>, TelemetryError> {
    let resource = Resource::builder()
        .with_service_name(config.service_name.clone())
        .with_attribute(KeyValue::new("service.version", env!("CARGO_PKG_VERSION")))
        .build();

    let provider = match config.exporter {
        ExporterKind::None => return Ok(None),
        ExporterKind::Stdout => SdkTracerProvider::builder()
            .with_resource(resource)
            .with_batch_exporter(opentelemetry_stdout::SpanExporter::default())
            .build(),
        ExporterKind::Otlp => {
            let exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_http()
                .with_endpoint(config.otlp_endpoint.clone())
                .build()?;
            SdkTracerProvider::builder()
                .with_resource(resource)
                .with_batch_exporter(exporter)
                .build()
        }
    };

    Ok(Some(provider))
}

/// Install process-wide telemetry.
///
/// Fails if a global subscriber is already installed; startup treats any
/// error here as fatal.
pub fn setup(config: &ObservabilityConfig) -> Result<TelemetryGuard, TelemetryError> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    let provider = build_provider(config)?;
    let otel_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(config.service_name.clone()))
    });

    tracing_subscriber::registry()
        .with(logging::env_filter(&config.log_filter))
        .with(logging::fmt_layer())
        .with(otel_layer)
        .try_init()?;

    if let Some(provider) = &provider {
        global::set_tracer_provider(provider.clone());
    }

    tracing::info!(
        service_name = %config.service_name,
        exporter = ?config.exporter,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard { provider })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_exporter_has_no_provider() {
        let config = ObservabilityConfig {
            exporter: ExporterKind::None,
            ..ObservabilityConfig::default()
        };
        let guard = TelemetryGuard {
            provider: build_provider(&config).unwrap(),
        };
        assert!(!guard.is_exporting());
        assert!(guard.shutdown().is_ok());
    }

    #[test]
    fn test_stdout_provider_shuts_down_cleanly() {
        let guard = TelemetryGuard {
            provider: build_provider(&ObservabilityConfig::default()).unwrap(),
        };
        assert!(guard.is_exporting());
        assert!(guard.shutdown().is_ok());
    }
}

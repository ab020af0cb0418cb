//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, route, status
//! - `http_request_duration_seconds` (histogram): latency by method, route
//!
//! Recording is always on; without an installed recorder the macros are
//! no-ops. The Prometheus listener is installed only when enabled in config.

use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
///
/// Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one completed request.
pub fn record_request(method: &str, route: &str, status: u16, start_time: Instant) {
    let route_labels = [("method", method.to_string()), ("route", route.to_string())];
    let status_labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    ::metrics::counter!("http_requests_total", &status_labels).increment(1);
    ::metrics::histogram!("http_request_duration_seconds", &route_labels)
        .record(start_time.elapsed().as_secs_f64());
}

/// Middleware timing every request against its matched route.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    record_request(&method, &route, response.status().as_u16(), start_time);
    response
}

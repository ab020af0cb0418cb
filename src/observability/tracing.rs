//! Distributed tracing support.
//!
//! # Responsibilities
//! - Extract trace context from incoming requests
//! - Create one server span per request, named after the matched route
//! - Record the response status on that span
//!
//! Handlers and store calls run inside the request span, so their spans
//! become its children without passing anything explicitly.

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{ConnectInfo, MatchedPath};
use axum::http::{HeaderMap, Request, Response};
use opentelemetry::propagation::Extractor;
use tracing::{field::Empty, Span};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::http::RequestIdExt;

/// Read-only view of request headers for the OpenTelemetry propagator.
pub struct HeaderExtractor<'a>(pub &'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|name| name.as_str()).collect()
    }
}

/// Remote parent context carried by `traceparent` / `tracestate`.
pub fn extract_parent_context(headers: &HeaderMap) -> opentelemetry::Context {
    opentelemetry::global::get_text_map_propagator(|propagator| {
        propagator.extract(&HeaderExtractor(headers))
    })
}

/// Build the server span for `request`.
pub fn make_request_span(request: &Request<Body>) -> Span {
    let method = request.method();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(MatchedPath::as_str)
        .unwrap_or_else(|| request.uri().path());
    let request_id = request.request_id().unwrap_or("unknown");
    let client_address = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string());

    let span = tracing::info_span!(
        "http.request",
        otel.name = %format!("{method} {route}"),
        otel.kind = "server",
        otel.status_code = Empty,
        http.method = %method,
        http.route = %route,
        http.status_code = Empty,
        client.address = client_address.as_deref(),
        request_id = %request_id,
    );

    // Fails when no OpenTelemetry layer is installed (exporter `none`).
    if let Err(err) = span.set_parent(extract_parent_context(request.headers())) {
        tracing::debug!(error = ?err, "Trace parent not attached");
    }
    span
}

/// Record the outcome of a request on its span.
pub fn record_response(response: &Response<Body>, latency: Duration, span: &Span) {
    let status = response.status();
    span.record("http.status_code", status.as_u16());
    if status.is_server_error() {
        span.record("otel.status_code", "ERROR");
    }

    tracing::debug!(
        status = status.as_u16(),
        latency_ms = latency.as_millis() as u64,
        "Request finished"
    );
}

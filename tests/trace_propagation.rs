//! Trace propagation from inbound headers down to store spans.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use opentelemetry::trace::{SpanId, TraceId, TracerProvider as _};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider, SpanData};
use tower::ServiceExt;
use tracing_subscriber::layer::SubscriberExt;

mod common;

const TRACE_ID: &str = "4bf92f3577b34da6a3ce929d0e0e4736";
const REMOTE_PARENT: &str = "00f067aa0ba902b7";

fn traceparent() -> String {
    format!("00-{TRACE_ID}-{REMOTE_PARENT}-01")
}

/// Spans exported while `requests` run against an OpenTelemetry-bridged subscriber.
async fn collect_spans(requests: &[&str]) -> Vec<SpanData> {
    opentelemetry::global::set_text_map_propagator(TraceContextPropagator::new());

    let exporter = InMemorySpanExporter::default();
    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(exporter.clone())
        .build();
    let subscriber = tracing_subscriber::registry()
        .with(tracing_opentelemetry::layer().with_tracer(provider.tracer("product-api-test")));
    let _default = tracing::subscriber::set_default(subscriber);

    let router = common::router(common::seeded_state());
    for uri in requests {
        let request = Request::builder()
            .uri(*uri)
            .header("traceparent", traceparent())
            .body(Body::empty())
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        // The request span closes once the body is drained.
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
    }

    provider.force_flush().unwrap();
    exporter.get_finished_spans().unwrap()
}

fn spans_named<'a>(spans: &'a [SpanData], name: &str) -> Vec<&'a SpanData> {
    spans.iter().filter(|span| span.name == name).collect()
}

#[tokio::test]
async fn test_store_span_is_child_of_request_span() {
    let spans = collect_spans(&["/products/1", "/products/2", "/products"]).await;

    let trace_id = TraceId::from_hex(TRACE_ID).unwrap();
    let remote_parent = SpanId::from_hex(REMOTE_PARENT).unwrap();

    let mut requests = spans_named(&spans, "GET /products/{id}");
    requests.extend(spans_named(&spans, "GET /products"));
    let queries = spans_named(&spans, "SELECT products");
    assert_eq!(requests.len(), 3);
    assert_eq!(queries.len(), 3);

    for request in &requests {
        assert_eq!(request.span_context.trace_id(), trace_id);
        assert_eq!(request.parent_span_id, remote_parent);
    }

    for query in &queries {
        assert_eq!(query.span_context.trace_id(), trace_id);
        let parent = requests
            .iter()
            .find(|request| request.span_context.span_id() == query.parent_span_id);
        assert!(parent.is_some(), "query span has no request parent");
    }
}

#[tokio::test]
async fn test_request_span_records_route_and_status() {
    let spans = collect_spans(&["/products/1"]).await;

    let request = spans_named(&spans, "GET /products/{id}")
        .into_iter()
        .next()
        .expect("request span exported");
    let attribute = |key: &str| {
        request
            .attributes
            .iter()
            .find(|kv| kv.key.as_str() == key)
            .map(|kv| kv.value.to_string())
    };
    assert_eq!(attribute("http.route").as_deref(), Some("/products/{id}"));
    assert_eq!(attribute("http.status_code").as_deref(), Some("200"));
}

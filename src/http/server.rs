//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, request span, metrics, CORS, deadline)
//! - Bind server to listener
//! - Stop accepting and drain on the shutdown signal

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::http::handlers;
use crate::http::middleware::{cors_middleware, deadline_layer, handle_middleware_error};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::observability::metrics::track_metrics;
use crate::observability::tracing::{make_request_span, record_response};
use crate::store::{ProductRepository, ProductRepositoryArc};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub products: ProductRepositoryArc,
}

impl AppState {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }
}

/// Build the router with all middleware layers.
///
/// Routes and the fallback are registered before the layers so every one
/// of them, including method-not-allowed and unknown paths, runs through
/// the full middleware stack.
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/products", get(handlers::list_products))
        .route("/products/{id}", get(handlers::get_product))
        .fallback(handlers::no_route)
        .layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(propagate_request_id_layer())
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(make_request_span)
                        .on_response(record_response),
                )
                .layer(axum::middleware::from_fn(track_metrics))
                .layer(axum::middleware::from_fn(cors_middleware))
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(deadline_layer(request_timeout)),
        )
        .with_state(state)
}

/// HTTP server for the product API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &AppConfig, state: AppState) -> Self {
        let router = build_router(state, Duration::from_secs(config.timeouts.request_secs));
        Self { router }
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

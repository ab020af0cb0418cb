//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use product_api::config::AppConfig;
use product_api::http::{build_router, AppState, HttpServer};
use product_api::lifecycle::Shutdown;
use product_api::store::{MemoryProductRepository, Product, ProductRepository, StoreError};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceExt;

pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// The two products used by the end-to-end scenario.
pub fn seed() -> Vec<Product> {
    vec![Product::new(1, "A"), Product::new(2, "B")]
}

pub fn seeded_state() -> AppState {
    state_with(MemoryProductRepository::with_data(seed()))
}

pub fn state_with<R: ProductRepository + 'static>(repository: R) -> AppState {
    AppState::new(Arc::new(repository))
}

pub fn router(state: AppState) -> Router {
    build_router(state, TEST_TIMEOUT)
}

/// Captured response parts.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }
}

/// Send one request through the router in-process.
pub async fn send(router: Router, method: Method, uri: &str) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn assert_cors_headers(headers: &HeaderMap) {
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-credentials"], "true");
    assert_eq!(headers["access-control-allow-headers"], "*");
    assert_eq!(
        headers["access-control-allow-methods"],
        "POST, OPTIONS, GET, PUT"
    );
}

/// Repository that counts calls before delegating.
#[derive(Default)]
pub struct CountingRepository {
    pub inner: MemoryProductRepository,
    pub calls: Arc<AtomicUsize>,
}

impl CountingRepository {
    pub fn new(inner: MemoryProductRepository) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl ProductRepository for CountingRepository {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list_products().await
    }

    async fn get_product(&self, id: i64) -> Result<Product, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_product(id).await
    }
}

/// A server bound to an ephemeral port.
pub struct RunningServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl RunningServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server to drain.
    pub async fn stop(self) -> Result<(), std::io::Error> {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server stops within 5s")
            .expect("server task did not panic")
    }
}

/// Start a real server for `state` on 127.0.0.1.
pub async fn start_server(state: AppState) -> RunningServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut config = AppConfig::default();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(&config, state);
    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    RunningServer {
        addr,
        shutdown,
        handle,
    }
}

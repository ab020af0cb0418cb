//! Data access subsystem.
//!
//! # Data Flow
//! ```text
//! handler (inside the request span)
//!     → ProductRepository (trait object in AppState)
//!     → db.query span (child of the request span)
//!     → postgres.rs (sqlx pool) or memory.rs (fixed data)
//! ```
//!
//! # Design Decisions
//! - Handlers only see the trait; the pool never leaks into the HTTP layer
//! - Every query gets its own span following the database semantic conventions
//! - Cancellation is by drop: an abandoned request drops the query future

use std::sync::Arc;

use async_trait::async_trait;

pub mod memory;
pub mod model;
pub mod postgres;

pub use memory::MemoryProductRepository;
pub use model::Product;
pub use postgres::PgProductRepository;

/// Table holding [`Product`] rows.
pub const PRODUCTS_TABLE: &str = "products";

/// Errors surfaced by a repository at request time.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No row matches the requested id.
    #[error("product {0} not found")]
    NotFound(i64),

    /// The query itself failed (connection lost, pool exhausted, bad SQL).
    #[error("database query failed: {0}")]
    Query(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Query(Box::new(err))
    }
}

/// Read access to products.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// All products, ordered by id.
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    /// A single product, or [`StoreError::NotFound`].
    async fn get_product(&self, id: i64) -> Result<Product, StoreError>;
}

/// Shared handle stored in the application state.
pub type ProductRepositoryArc = Arc<dyn ProductRepository>;

/// Span wrapping one store operation.
///
/// Created inside the caller's span, so it becomes a child of the
/// request span and the exported trace shows database latency.
pub(crate) fn query_span(
    system: &'static str,
    operation: &'static str,
    statement: &str,
) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        otel.name = %format!("{operation} {PRODUCTS_TABLE}"),
        otel.kind = "client",
        otel.status_code = tracing::field::Empty,
        db.system = system,
        db.operation = operation,
        db.sql.table = PRODUCTS_TABLE,
        db.statement = statement,
        db.rows = tracing::field::Empty,
    )
}

/// Record the outcome of a store operation on its span.
pub(crate) fn record_outcome<T>(span: &tracing::Span, result: &Result<T, StoreError>, rows: usize) {
    match result {
        Ok(_) => {
            span.record("db.rows", rows);
        }
        Err(StoreError::NotFound(_)) => {
            span.record("db.rows", 0);
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            tracing::error!(parent: span, error = %err, "Store query failed");
        }
    }
}

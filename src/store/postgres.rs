//! PostgreSQL-backed product repository.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::Instrument;

use crate::config::DatabaseConfig;
use crate::lifecycle::startup::StartupError;
use crate::store::{query_span, record_outcome, Product, ProductRepository, StoreError};

const CREATE_PRODUCTS: &str = "CREATE TABLE IF NOT EXISTS products (\
    id BIGSERIAL PRIMARY KEY, \
    name TEXT NOT NULL\
)";
const SELECT_PRODUCTS: &str = "SELECT id, name FROM products ORDER BY id";
const SELECT_PRODUCT: &str = "SELECT id, name FROM products WHERE id = $1";

/// Repository over a shared sqlx connection pool.
///
/// Cloning is cheap; the pool is reference counted and handles its own
/// synchronization.
#[derive(Debug, Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    /// Open the pool and verify the store is reachable.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StartupError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(StartupError::Connection)?;

        tracing::info!(
            max_connections = config.max_connections,
            "Connected to PostgreSQL"
        );

        Ok(Self { pool })
    }

    /// Create the products table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StartupError> {
        sqlx::query(CREATE_PRODUCTS)
            .execute(&self.pool)
            .instrument(tracing::info_span!(
                "db.migrate",
                db.system = "postgresql",
                db.statement = CREATE_PRODUCTS,
            ))
            .await
            .map_err(StartupError::Schema)?;

        tracing::info!(table = crate::store::PRODUCTS_TABLE, "Schema ensured");
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let span = query_span("postgresql", "SELECT", SELECT_PRODUCTS);
        let result = sqlx::query_as::<_, Product>(SELECT_PRODUCTS)
            .fetch_all(&self.pool)
            .instrument(span.clone())
            .await
            .map_err(StoreError::from);

        let rows = result.as_ref().map_or(0, Vec::len);
        record_outcome(&span, &result, rows);
        result
    }

    async fn get_product(&self, id: i64) -> Result<Product, StoreError> {
        let span = query_span("postgresql", "SELECT", SELECT_PRODUCT);
        let result = sqlx::query_as::<_, Product>(SELECT_PRODUCT)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span.clone())
            .await
            .map_err(StoreError::from)
            .and_then(|row| row.ok_or(StoreError::NotFound(id)));

        record_outcome(&span, &result, 1);
        result
    }
}

//! In-memory product repository.
//!
//! Holds a fixed product list. Used by the test suite and for running the
//! HTTP surface without a database.

use std::time::Duration;

use async_trait::async_trait;
use tracing::Instrument;

use crate::store::{query_span, record_outcome, Product, ProductRepository, StoreError};

/// Fixed-data implementation of [`ProductRepository`].
#[derive(Debug, Default)]
pub struct MemoryProductRepository {
    products: Vec<Product>,
    latency: Option<Duration>,
    failure: Option<String>,
}

/// Raised by an unavailable memory repository.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct Unavailable(String);

impl MemoryProductRepository {
    /// Creates a new empty memory product repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository holding `products`, ordered by id.
    pub fn with_data(mut products: Vec<Product>) -> Self {
        products.sort_by_key(|product| product.id);
        Self {
            products,
            ..Self::default()
        }
    }

    /// Delay every operation by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// A repository whose every query fails with `reason`.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    async fn simulate(&self) -> Result<(), StoreError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match &self.failure {
            Some(reason) => Err(StoreError::Query(Box::new(Unavailable(reason.clone())))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let span = query_span("memory", "SELECT", "list products");
        let result = async {
            self.simulate().await?;
            Ok::<_, StoreError>(self.products.clone())
        }
        .instrument(span.clone())
        .await;

        let rows = result.as_ref().map_or(0, Vec::len);
        record_outcome(&span, &result, rows);
        result
    }

    async fn get_product(&self, id: i64) -> Result<Product, StoreError> {
        let span = query_span("memory", "SELECT", "get product by id");
        let result = async {
            self.simulate().await?;
            self.products
                .iter()
                .find(|product| product.id == id)
                .cloned()
                .ok_or(StoreError::NotFound(id))
        }
        .instrument(span.clone())
        .await;

        record_outcome(&span, &result, 1);
        result
    }
}

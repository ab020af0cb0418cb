//! Route handlers.

use axum::extract::{Path, State};
use axum::http::Uri;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::store::Product;

/// Body of `GET /ping`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pong {
    pub message: String,
}

/// `GET /ping`: liveness, never touches the store.
pub async fn ping() -> Json<Pong> {
    Json(Pong {
        message: "pong".to_string(),
    })
}

/// `GET /products`
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.products.list_products().await?;
    tracing::debug!(count = products.len(), "Listed products");
    Ok(Json(products))
}

/// `GET /products/{id}`
///
/// The id is taken as a string so a malformed id still gets the JSON
/// error envelope instead of the extractor's plain-text rejection.
pub async fn get_product(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let id: i64 = raw_id.parse().map_err(|_| ApiError::InvalidId(raw_id.clone()))?;
    let product = state.products.get_product(id).await?;
    Ok(Json(product))
}

/// Fallback for unknown paths.
pub async fn no_route(uri: Uri) -> ApiError {
    ApiError::NoRoute(uri.path().to_string())
}

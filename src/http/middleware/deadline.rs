//! Per-request deadline.
//!
//! Every route runs under the same deadline. When it expires the handler
//! future is dropped, which also cancels any in-flight store query, and the
//! client gets a 504 error envelope.

use std::time::Duration;

use axum::BoxError;
use tower::timeout::{error::Elapsed, TimeoutLayer};

use crate::http::error::ApiError;

/// Timeout layer for the configured deadline.
pub fn deadline_layer(deadline: Duration) -> TimeoutLayer {
    TimeoutLayer::new(deadline)
}

/// Turn middleware errors into the error envelope.
pub async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::Timeout
    } else {
        ApiError::Internal(err.to_string())
    }
}

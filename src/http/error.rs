//! Request-time errors and the JSON error envelope.
//!
//! Every failure leaving a handler becomes `{"error": "<message>"}` with the
//! mapped status. Nothing is retried and nothing propagates further up.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Errors a handler or middleware can answer with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid product id '{0}'")]
    InvalidId(String),

    #[error("request timed out")]
    Timeout,

    #[error("no route for {0}")]
    NoRoute(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::Query(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidId(_) => StatusCode::BAD_REQUEST,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::NoRoute(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(StoreError::NotFound(7)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StoreError::from(sqlx::Error::PoolTimedOut)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::InvalidId("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Timeout.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ApiError::from(StoreError::NotFound(99)).to_string(),
            "product 99 not found"
        );
        assert_eq!(
            ApiError::InvalidId("abc".into()).to_string(),
            "invalid product id 'abc'"
        );
    }
}

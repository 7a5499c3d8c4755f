//! Gateway error type
//!
//! Everything user-visible goes out through the `{success, error}` envelope:
//! 400 for client mistakes, 404 for unknown ids/symbols, 500 for
//! collaborator failures.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use types::errors::{ExchangeError, OrderError, StoreError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl From<ExchangeError> for AppError {
    fn from(err: ExchangeError) -> Self {
        match err {
            ExchangeError::Order(inner @ OrderError::NotFound { .. }) => {
                AppError::NotFound(inner.to_string())
            }
            ExchangeError::Order(inner) => AppError::BadRequest(inner.to_string()),
            ExchangeError::Balance(inner) => AppError::BadRequest(inner.to_string()),
            ExchangeError::Store(inner) => AppError::Internal(inner.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_symbol_maps_to_bad_request() {
        let err: AppError = ExchangeError::Order(OrderError::UnknownSymbol {
            symbol: "DOGE-USD".to_string(),
        })
        .into();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err: AppError = ExchangeError::Order(OrderError::NotFound {
            order_id: "abc".to_string(),
        })
        .into();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_store_error_maps_to_internal() {
        let err: AppError = StoreError::Backend("down".to_string()).into();
        assert!(matches!(err, AppError::Internal(_)));
    }
}

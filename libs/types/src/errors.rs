//! Error taxonomy
//!
//! Client-caused problems (`OrderError`, `BalanceError`) are distinguished
//! from collaborator failures (`StoreError`); `ExchangeError` rolls them up
//! at the coordinator boundary. Matching arithmetic itself never fails.

use thiserror::Error;

/// Top-level error for coordinator operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExchangeError {
    #[error("order error: {0}")]
    Order(#[from] OrderError),

    #[error("balance error: {0}")]
    Balance(#[from] BalanceError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Order validation and lookup errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrderError {
    #[error("unknown symbol: {symbol}")]
    UnknownSymbol { symbol: String },

    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("invalid price: {0}")]
    InvalidPrice(String),

    #[error("order not found: {order_id}")]
    NotFound { order_id: String },
}

/// Balance mutation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BalanceError {
    #[error("insufficient {asset} balance: required {required}, available {available}")]
    Insufficient {
        asset: String,
        required: String,
        available: String,
    },
}

/// Persistence collaborator failures (transient, backend-specific)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_error_display() {
        let err = OrderError::UnknownSymbol {
            symbol: "DOGE-USD".to_string(),
        };
        assert_eq!(err.to_string(), "unknown symbol: DOGE-USD");
    }

    #[test]
    fn test_balance_error_display() {
        let err = BalanceError::Insufficient {
            asset: "BTC".to_string(),
            required: "1.5".to_string(),
            available: "1.0".to_string(),
        };
        assert!(err.to_string().contains("BTC"));
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn test_rollup_from_order_error() {
        let err: ExchangeError = OrderError::InvalidQuantity("zero".to_string()).into();
        assert!(matches!(err, ExchangeError::Order(_)));
    }

    #[test]
    fn test_rollup_from_store_error() {
        let err: ExchangeError = StoreError::Backend("connection reset".to_string()).into();
        assert!(matches!(err, ExchangeError::Store(_)));
    }
}

//! Per-asset balances and settlement mutations
//!
//! A balance row is keyed by `(user_id, asset)` and splits into `available`
//! and `locked`. Settlement moves value between the `available` columns of
//! four rows; the whole move commits atomically at the store.

use crate::errors::BalanceError;
use crate::ids::{TradeId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One user's holdings of one asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub user_id: UserId,
    pub asset: String,
    pub available: Decimal,
    pub locked: Decimal,
    pub updated_at: i64,
}

impl Balance {
    /// Empty balance row
    pub fn new(user_id: UserId, asset: impl Into<String>) -> Self {
        Self {
            user_id,
            asset: asset.into(),
            available: Decimal::ZERO,
            locked: Decimal::ZERO,
            updated_at: 0,
        }
    }

    /// Total holdings across both columns
    pub fn total(&self) -> Decimal {
        self.available + self.locked
    }

    /// Move funds from available to locked (order admission reservation)
    pub fn lock(&mut self, amount: Decimal, timestamp: i64) -> Result<(), BalanceError> {
        if amount > self.available {
            return Err(BalanceError::Insufficient {
                asset: self.asset.clone(),
                required: amount.to_string(),
                available: self.available.to_string(),
            });
        }
        self.available -= amount;
        self.locked += amount;
        self.updated_at = timestamp;
        Ok(())
    }

    /// Move funds from locked back to available
    pub fn unlock(&mut self, amount: Decimal, timestamp: i64) -> Result<(), BalanceError> {
        if amount > self.locked {
            return Err(BalanceError::Insufficient {
                asset: self.asset.clone(),
                required: amount.to_string(),
                available: self.locked.to_string(),
            });
        }
        self.locked -= amount;
        self.available += amount;
        self.updated_at = timestamp;
        Ok(())
    }
}

/// A signed mutation of one balance row's `available` column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceChange {
    pub user_id: UserId,
    pub asset: String,
    pub delta: Decimal,
}

/// The four balance mutations produced by settling one trade
///
/// Buyer pays quote and receives base; seller mirrors. Deltas sum to zero
/// per asset, so applying all four conserves total funds exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub trade_id: TradeId,
    pub entries: [BalanceChange; 4],
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_lock_unlock() {
        let mut balance = Balance::new(UserId::from("user-1"), "USD");
        balance.available = Decimal::from(10000);

        balance.lock(Decimal::from(3000), 100).unwrap();
        assert_eq!(balance.available, Decimal::from(7000));
        assert_eq!(balance.locked, Decimal::from(3000));
        assert_eq!(balance.total(), Decimal::from(10000));

        balance.unlock(Decimal::from(1000), 200).unwrap();
        assert_eq!(balance.available, Decimal::from(8000));
        assert_eq!(balance.locked, Decimal::from(2000));
    }

    #[test]
    fn test_overlock_rejected() {
        let mut balance = Balance::new(UserId::from("user-1"), "USD");
        balance.available = Decimal::from(100);

        let err = balance.lock(Decimal::from(150), 100).unwrap_err();
        assert!(matches!(err, BalanceError::Insufficient { .. }));
        // no partial mutation
        assert_eq!(balance.available, Decimal::from(100));
        assert_eq!(balance.locked, Decimal::ZERO);
    }

    #[test]
    fn test_overunlock_rejected() {
        let mut balance = Balance::new(UserId::from("user-1"), "USD");
        balance.available = Decimal::from(100);
        balance.lock(Decimal::from(50), 100).unwrap();

        assert!(balance.unlock(Decimal::from(60), 200).is_err());
    }

    #[test]
    fn test_exact_decimal_lock() {
        let mut balance = Balance::new(UserId::from("user-1"), "BTC");
        balance.available = Decimal::from_str("0.3").unwrap();
        balance
            .lock(Decimal::from_str("0.1").unwrap(), 100)
            .unwrap();
        assert_eq!(balance.available, Decimal::from_str("0.2").unwrap());
    }
}

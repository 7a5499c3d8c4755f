//! Collaborator traits for persistence
//!
//! The coordinator is polymorphic over these capability sets rather than a
//! concrete database type; any backend that can satisfy them (in-memory,
//! SQL, ...) plugs in behind an `Arc<dyn ...>`. Implementations must be safe
//! under concurrent writes from all symbols.

use crate::balance::{Balance, Settlement};
use crate::book::Ticker;
use crate::errors::{ExchangeError, StoreError};
use crate::ids::{OrderId, Symbol, UserId};
use crate::order::Order;
use crate::trade::Trade;
use rust_decimal::Decimal;

/// Order persistence
pub trait OrderStore: Send + Sync {
    /// Persist a newly admitted order (the client-visible id becomes durable)
    fn save_order(&self, order: &Order) -> Result<(), StoreError>;

    /// Persist a new state of an existing order
    fn update_order(&self, order: &Order) -> Result<(), StoreError>;

    fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError>;

    /// A user's orders, most recent first
    fn get_orders_by_user(&self, user_id: &UserId, limit: usize) -> Result<Vec<Order>, StoreError>;

    /// Open (PENDING/PARTIAL) orders for a symbol, oldest first
    fn get_open_orders(&self, symbol: &Symbol) -> Result<Vec<Order>, StoreError>;
}

/// Trade persistence
pub trait TradeStore: Send + Sync {
    fn save_trade(&self, trade: &Trade) -> Result<(), StoreError>;

    /// A symbol's trades, most recent first
    fn get_recent_trades(&self, symbol: &Symbol, limit: usize) -> Result<Vec<Trade>, StoreError>;

    /// Trades a user took part in (either side), most recent first
    fn get_user_trades(&self, user_id: &UserId, limit: usize) -> Result<Vec<Trade>, StoreError>;
}

/// Balance persistence
///
/// `lock_balance`/`unlock_balance` must be serializable per `(user, asset)`
/// row; `apply_settlement` must commit all four mutations or none.
pub trait BalanceStore: Send + Sync {
    /// A user's balance for one asset; missing rows read as zero
    fn get_balance(&self, user_id: &UserId, asset: &str) -> Result<Balance, StoreError>;

    fn get_balances(&self, user_id: &UserId) -> Result<Vec<Balance>, StoreError>;

    /// Reserve funds for an order (admission-time fund lock)
    fn lock_balance(
        &self,
        user_id: &UserId,
        asset: &str,
        amount: Decimal,
    ) -> Result<(), ExchangeError>;

    /// Release previously reserved funds
    fn unlock_balance(
        &self,
        user_id: &UserId,
        asset: &str,
        amount: Decimal,
    ) -> Result<(), ExchangeError>;

    /// Apply a trade's four balance mutations transactionally
    fn apply_settlement(&self, settlement: &Settlement) -> Result<(), StoreError>;
}

/// Ticker persistence
pub trait TickerStore: Send + Sync {
    fn get_ticker(&self, symbol: &Symbol) -> Result<Option<Ticker>, StoreError>;

    fn update_ticker(&self, ticker: &Ticker) -> Result<(), StoreError>;

    fn get_all_tickers(&self) -> Result<Vec<Ticker>, StoreError>;
}

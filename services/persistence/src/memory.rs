//! In-memory store
//!
//! Orders and tickers live in hash maps, trades in an append-only vector
//! (insertion order is execution order, so "recent" queries walk it
//! backwards). The whole balance table sits behind one mutex: a
//! settlement's four row mutations commit under a single acquisition,
//! which is this backend's transaction.

use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use types::balance::{Balance, Settlement};
use types::book::Ticker;
use types::errors::{ExchangeError, StoreError};
use types::ids::{OrderId, Symbol, UserId};
use types::order::Order;
use types::store::{BalanceStore, OrderStore, TickerStore, TradeStore};
use types::trade::Trade;

fn unix_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as i64
}

/// In-memory backend for all four store traits
#[derive(Default)]
pub struct MemoryStore {
    orders: RwLock<HashMap<OrderId, Order>>,
    trades: RwLock<Vec<Trade>>,
    balances: Mutex<HashMap<(UserId, String), Balance>>,
    tickers: RwLock<HashMap<Symbol, Ticker>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a demo balance (startup only, not part of the store contract)
    pub fn seed_balance(&self, user_id: UserId, asset: &str, available: Decimal) {
        let mut balances = self.balances.lock();
        let mut balance = Balance::new(user_id.clone(), asset);
        balance.available = available;
        balance.updated_at = unix_nanos();
        balances.insert((user_id, asset.to_string()), balance);
    }

    /// Seed a demo ticker (startup only)
    pub fn seed_ticker(&self, ticker: Ticker) {
        self.tickers.write().insert(ticker.symbol.clone(), ticker);
    }
}

impl OrderStore for MemoryStore {
    fn save_order(&self, order: &Order) -> Result<(), StoreError> {
        self.orders.write().insert(order.id, order.clone());
        Ok(())
    }

    fn update_order(&self, order: &Order) -> Result<(), StoreError> {
        self.orders.write().insert(order.id, order.clone());
        Ok(())
    }

    fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().get(order_id).cloned())
    }

    fn get_orders_by_user(&self, user_id: &UserId, limit: usize) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read();
        let mut result: Vec<Order> = orders
            .values()
            .filter(|o| &o.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by_key(|o| std::cmp::Reverse(o.created_at));
        result.truncate(limit);
        Ok(result)
    }

    fn get_open_orders(&self, symbol: &Symbol) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read();
        let mut result: Vec<Order> = orders
            .values()
            .filter(|o| &o.symbol == symbol && !o.status.is_terminal())
            .cloned()
            .collect();
        result.sort_by_key(|o| o.created_at);
        Ok(result)
    }
}

impl TradeStore for MemoryStore {
    fn save_trade(&self, trade: &Trade) -> Result<(), StoreError> {
        self.trades.write().push(trade.clone());
        Ok(())
    }

    fn get_recent_trades(&self, symbol: &Symbol, limit: usize) -> Result<Vec<Trade>, StoreError> {
        let trades = self.trades.read();
        Ok(trades
            .iter()
            .rev()
            .filter(|t| &t.symbol == symbol)
            .take(limit)
            .cloned()
            .collect())
    }

    fn get_user_trades(&self, user_id: &UserId, limit: usize) -> Result<Vec<Trade>, StoreError> {
        let trades = self.trades.read();
        Ok(trades
            .iter()
            .rev()
            .filter(|t| &t.buyer_id == user_id || &t.seller_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

impl BalanceStore for MemoryStore {
    fn get_balance(&self, user_id: &UserId, asset: &str) -> Result<Balance, StoreError> {
        let balances = self.balances.lock();
        Ok(balances
            .get(&(user_id.clone(), asset.to_string()))
            .cloned()
            .unwrap_or_else(|| Balance::new(user_id.clone(), asset)))
    }

    fn get_balances(&self, user_id: &UserId) -> Result<Vec<Balance>, StoreError> {
        let balances = self.balances.lock();
        let mut result: Vec<Balance> = balances
            .values()
            .filter(|b| &b.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.asset.cmp(&b.asset));
        Ok(result)
    }

    fn lock_balance(
        &self,
        user_id: &UserId,
        asset: &str,
        amount: Decimal,
    ) -> Result<(), ExchangeError> {
        let mut balances = self.balances.lock();
        let balance = balances
            .entry((user_id.clone(), asset.to_string()))
            .or_insert_with(|| Balance::new(user_id.clone(), asset));
        balance.lock(amount, unix_nanos())?;
        Ok(())
    }

    fn unlock_balance(
        &self,
        user_id: &UserId,
        asset: &str,
        amount: Decimal,
    ) -> Result<(), ExchangeError> {
        let mut balances = self.balances.lock();
        let balance = balances
            .entry((user_id.clone(), asset.to_string()))
            .or_insert_with(|| Balance::new(user_id.clone(), asset));
        balance.unlock(amount, unix_nanos())?;
        Ok(())
    }

    fn apply_settlement(&self, settlement: &Settlement) -> Result<(), StoreError> {
        // one lock acquisition covers all four rows
        let mut balances = self.balances.lock();
        let now = unix_nanos();
        for entry in &settlement.entries {
            let balance = balances
                .entry((entry.user_id.clone(), entry.asset.clone()))
                .or_insert_with(|| Balance::new(entry.user_id.clone(), &entry.asset));
            balance.available += entry.delta;
            balance.updated_at = now;
        }
        Ok(())
    }
}

impl TickerStore for MemoryStore {
    fn get_ticker(&self, symbol: &Symbol) -> Result<Option<Ticker>, StoreError> {
        Ok(self.tickers.read().get(symbol).cloned())
    }

    fn update_ticker(&self, ticker: &Ticker) -> Result<(), StoreError> {
        self.tickers
            .write()
            .insert(ticker.symbol.clone(), ticker.clone());
        Ok(())
    }

    fn get_all_tickers(&self) -> Result<Vec<Ticker>, StoreError> {
        let mut tickers: Vec<Ticker> = self.tickers.read().values().cloned().collect();
        tickers.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(tickers)
    }
}

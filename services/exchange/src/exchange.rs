//! The exchange coordinator
//!
//! Owns one matching engine per registered symbol, routes inbound orders,
//! and pumps engine egress: every trade is persisted, settled, then
//! published; every order update is persisted and published. Failures at
//! the egress boundary are isolated per event: a bad persistence write
//! never stops trade processing for the rest of the batch.

use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use market_data::{EventBus, MarketEvent};
use matching_engine::MatchingEngine;
use types::book::OrderBookSnapshot;
use types::errors::{ExchangeError, OrderError};
use types::ids::{OrderId, Symbol};
use types::numeric::Price;
use types::order::{Order, OrderType};
use types::store::{BalanceStore, OrderStore, TradeStore};
use types::trade::Trade;

use crate::settlement::settlement_for;

/// Egress pump tick
const DRAIN_INTERVAL: Duration = Duration::from_millis(10);
/// Settlement attempts before raising the operator alarm
const SETTLEMENT_ATTEMPTS: u32 = 3;

/// Multi-symbol exchange
pub struct Exchange {
    engines: DashMap<Symbol, Arc<MatchingEngine>>,
    orders: Arc<dyn OrderStore>,
    trades: Arc<dyn TradeStore>,
    balances: Arc<dyn BalanceStore>,
    bus: Arc<EventBus>,
    running: AtomicBool,
}

impl Exchange {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        trades: Arc<dyn TradeStore>,
        balances: Arc<dyn BalanceStore>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            engines: DashMap::new(),
            orders,
            trades,
            balances,
            bus,
            running: AtomicBool::new(false),
        }
    }

    /// Register a trading pair; idempotent
    pub fn register_symbol(&self, symbol: Symbol) {
        self.engines
            .entry(symbol.clone())
            .or_insert_with(|| {
                info!(%symbol, "trading pair registered");
                Arc::new(MatchingEngine::new(symbol))
            });
    }

    /// All registered trading pairs
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = self.engines.iter().map(|e| e.key().clone()).collect();
        symbols.sort();
        symbols
    }

    /// Admit an order: validate, persist, then hand to the engine
    ///
    /// Persisting first makes the client-visible id durable; a store failure
    /// leaves the engine untouched. Returns the admission snapshot.
    pub fn submit(&self, order: Order) -> Result<Order, ExchangeError> {
        self.validate(&order)?;

        let engine = self
            .engines
            .get(&order.symbol)
            .ok_or_else(|| OrderError::UnknownSymbol {
                symbol: order.symbol.to_string(),
            })?
            .clone();

        self.orders.save_order(&order)?;
        Ok(engine.submit(order))
    }

    fn validate(&self, order: &Order) -> Result<(), OrderError> {
        if !self.engines.contains_key(&order.symbol) {
            return Err(OrderError::UnknownSymbol {
                symbol: order.symbol.to_string(),
            });
        }
        if order.quantity.is_zero() {
            return Err(OrderError::InvalidQuantity(
                "quantity must be positive".to_string(),
            ));
        }
        match order.order_type {
            OrderType::Limit => {
                if order.price.is_none() {
                    return Err(OrderError::InvalidPrice(
                        "limit order requires a price".to_string(),
                    ));
                }
            }
            OrderType::StopLimit => {
                if order.price.is_none() {
                    return Err(OrderError::InvalidPrice(
                        "stop-limit order requires a limit price".to_string(),
                    ));
                }
                if order.stop_price.is_none() {
                    return Err(OrderError::InvalidPrice(
                        "stop-limit order requires a stop price".to_string(),
                    ));
                }
            }
            OrderType::Market => {}
        }
        Ok(())
    }

    /// Cancel an order on a symbol; false when unknown symbol or id
    pub fn cancel(&self, order_id: &OrderId, symbol: &Symbol) -> bool {
        match self.engines.get(symbol) {
            Some(engine) => engine.cancel(order_id),
            None => false,
        }
    }

    /// Depth snapshot; None for an unregistered symbol
    pub fn order_book(&self, symbol: &Symbol, depth: usize) -> Option<OrderBookSnapshot> {
        self.engines.get(symbol).map(|e| e.snapshot(depth))
    }

    /// Price tick from the feed: run the symbol's stop triggers
    pub fn on_price(&self, symbol: &Symbol, price: Price) {
        if let Some(engine) = self.engines.get(symbol) {
            engine.check_stops(price);
        }
    }

    /// Drain every engine's egress once: trades first, then order updates
    ///
    /// Public so tests can pump deterministically; the background task just
    /// calls this on a timer.
    pub fn drain_once(&self) {
        for entry in self.engines.iter() {
            let (trades, updates) = entry.value().drain_egress();

            for trade in trades {
                if let Err(e) = self.trades.save_trade(&trade) {
                    error!(trade_id = %trade.id, error = %e, "failed to persist trade");
                }
                self.settle(&trade);
                self.bus.publish(MarketEvent::trade(trade));
            }

            for order in updates {
                if let Err(e) = self.orders.update_order(&order) {
                    error!(order_id = %order.id, error = %e, "failed to persist order update");
                }
                self.bus.publish(MarketEvent::order_update(order));
            }
        }
    }

    /// Apply a trade's settlement, retrying transient store failures
    ///
    /// The trade is authoritative once emitted: a persistent failure is an
    /// operator alarm, never a rollback.
    fn settle(&self, trade: &Trade) {
        let settlement = settlement_for(trade);
        for attempt in 1..=SETTLEMENT_ATTEMPTS {
            match self.balances.apply_settlement(&settlement) {
                Ok(()) => return,
                Err(e) => {
                    warn!(
                        trade_id = %trade.id,
                        attempt,
                        error = %e,
                        "settlement attempt failed"
                    );
                }
            }
        }
        error!(
            trade_id = %trade.id,
            "settlement failed after {SETTLEMENT_ATTEMPTS} attempts; trade remains in the ledger"
        );
    }

    /// Spawn the egress pump
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);
        let exchange = Arc::clone(self);
        tokio::spawn(async move {
            info!("exchange egress pump started");
            while exchange.running.load(Ordering::SeqCst) {
                exchange.drain_once();
                tokio::time::sleep(DRAIN_INTERVAL).await;
            }
            // final sweep so shutdown loses nothing already queued
            exchange.drain_once();
            info!("exchange egress pump stopped");
        })
    }

    /// Ask the pump to stop after its next sweep
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persistence::MemoryStore;
    use types::ids::UserId;
    use types::numeric::Quantity;
    use types::order::{OrderStatus, Side, TimeInForce};

    fn harness() -> (Arc<Exchange>, Arc<MemoryStore>, Arc<EventBus>) {
        let store = Arc::new(MemoryStore::new());
        let bus = Arc::new(EventBus::default());
        let exchange = Arc::new(Exchange::new(
            store.clone(),
            store.clone(),
            store.clone(),
            bus.clone(),
        ));
        exchange.register_symbol(Symbol::new("BTC-USD"));
        (exchange, store, bus)
    }

    fn limit(user: &str, side: Side, price: u64, qty: &str) -> Order {
        Order::new(
            UserId::from(user),
            Symbol::new("BTC-USD"),
            side,
            OrderType::Limit,
            Quantity::from_str(qty).unwrap(),
            Some(Price::from_u64(price)),
            None,
            TimeInForce::GTC,
        )
    }

    #[test]
    fn test_unknown_symbol_rejected() {
        let (exchange, _, _) = harness();
        let mut order = limit("user-1", Side::BUY, 100, "1.0");
        order.symbol = Symbol::new("DOGE-USD");

        let err = exchange.submit(order).unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::Order(OrderError::UnknownSymbol { .. })
        ));
    }

    #[test]
    fn test_limit_without_price_rejected() {
        let (exchange, _, _) = harness();
        let mut order = limit("user-1", Side::BUY, 100, "1.0");
        order.price = None;

        assert!(matches!(
            exchange.submit(order).unwrap_err(),
            ExchangeError::Order(OrderError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_admission_is_persisted() {
        let (exchange, store, _) = harness();
        let admitted = exchange.submit(limit("user-1", Side::BUY, 100, "1.0")).unwrap();

        assert_eq!(admitted.status, OrderStatus::Pending);
        let stored = store.get_order(&admitted.id).unwrap().unwrap();
        assert_eq!(stored.id, admitted.id);
    }

    #[test]
    fn test_register_symbol_idempotent() {
        let (exchange, _, _) = harness();
        exchange.register_symbol(Symbol::new("BTC-USD"));
        exchange.register_symbol(Symbol::new("ETH-USD"));

        assert_eq!(
            exchange.symbols(),
            vec![Symbol::new("BTC-USD"), Symbol::new("ETH-USD")]
        );
    }

    #[test]
    fn test_order_book_for_unknown_symbol() {
        let (exchange, _, _) = harness();
        assert!(exchange.order_book(&Symbol::new("DOGE-USD"), 10).is_none());
        assert!(exchange.order_book(&Symbol::new("BTC-USD"), 10).is_some());
    }

    #[test]
    fn test_cancel_unknown_symbol_is_false() {
        let (exchange, _, _) = harness();
        let id = OrderId::new();
        assert!(!exchange.cancel(&id, &Symbol::new("DOGE-USD")));
        assert!(!exchange.cancel(&id, &Symbol::new("BTC-USD")));
    }
}

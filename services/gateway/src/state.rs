//! Shared application state

use exchange::Exchange;
use market_data::EventBus;
use std::sync::Arc;
use types::store::{BalanceStore, OrderStore, TickerStore, TradeStore};

#[derive(Clone)]
pub struct AppState {
    pub exchange: Arc<Exchange>,
    pub orders: Arc<dyn OrderStore>,
    pub trades: Arc<dyn TradeStore>,
    pub balances: Arc<dyn BalanceStore>,
    pub tickers: Arc<dyn TickerStore>,
    pub bus: Arc<EventBus>,
}

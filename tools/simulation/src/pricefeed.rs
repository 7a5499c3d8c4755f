//! Simulated price feed
//!
//! Geometric-Brownian random walk per symbol, clamped to ±5% per tick, with
//! the stablecoin pinned near 1.0. Each tick updates the ticker first, then
//! notifies the exchange (stop triggers) and broadcasts ticker + book
//! snapshot. The RNG is seeded, so a run is reproducible.

use parking_lot::RwLock;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use exchange::Exchange;
use market_data::{EventBus, MarketEvent};
use types::book::Ticker;
use types::ids::Symbol;
use types::numeric::Price;
use types::store::TickerStore;

fn unix_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as i64
}

#[derive(Debug, Clone)]
pub struct PriceFeedConfig {
    pub tick_interval: Duration,
    pub seed: u64,
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(3),
            seed: 7,
        }
    }
}

/// Random-walk price source for the demo symbols
pub struct PriceFeed {
    symbols: Vec<Symbol>,
    prices: RwLock<HashMap<Symbol, Decimal>>,
    tickers: Arc<dyn TickerStore>,
    config: PriceFeedConfig,
}

impl PriceFeed {
    /// Build a feed, initializing prices from the persisted tickers
    pub fn new(tickers: Arc<dyn TickerStore>, symbols: Vec<Symbol>, config: PriceFeedConfig) -> Self {
        let mut prices = HashMap::new();
        for symbol in &symbols {
            if let Ok(Some(ticker)) = tickers.get_ticker(symbol) {
                prices.insert(symbol.clone(), ticker.price.as_decimal());
            }
        }
        Self {
            symbols,
            prices: RwLock::new(prices),
            tickers,
            config,
        }
    }

    /// Latest simulated price for a symbol
    pub fn current_price(&self, symbol: &Symbol) -> Option<Decimal> {
        self.prices.read().get(symbol).copied()
    }

    /// Per-asset volatility of the walk
    fn volatility(symbol: &Symbol) -> f64 {
        match symbol.base() {
            "BTC" => 0.02,
            "ETH" => 0.025,
            "SOL" => 0.03,
            "USDC" => 0.0001,
            _ => 0.02,
        }
    }

    /// One random-walk step, clamped to ±5% of the current price
    pub fn step(current: Decimal, volatility: f64, shock: f64) -> Decimal {
        let current_f = match current.to_f64() {
            Some(v) if v > 0.0 => v,
            _ => return current,
        };
        let dt: f64 = 0.1 / 3600.0;
        let change = current_f * volatility * dt.sqrt() * shock;
        let next = (current_f + change).clamp(current_f * 0.95, current_f * 1.05);
        Decimal::from_f64(next)
            .map(|d| d.round_dp(2))
            .unwrap_or(current)
    }

    /// Advance every symbol once and fan the results out
    pub fn tick_once(&self, rng: &mut ChaCha8Rng, exchange: &Exchange, bus: &EventBus) {
        for symbol in &self.symbols {
            let Some(current) = self.current_price(symbol) else {
                continue;
            };

            let next = if symbol.base() == "USDC" {
                // stablecoin: tiny fluctuation around 1.0
                let wiggle: f64 = rng.gen::<f64>() - 0.5;
                Decimal::from_f64(1.0 + wiggle * 0.001)
                    .map(|d| d.round_dp(4))
                    .unwrap_or(Decimal::ONE)
            } else {
                let shock: f64 = rng.sample(StandardNormal);
                Self::step(current, Self::volatility(symbol), shock)
            };

            let Some(price) = Price::try_new(next) else {
                continue;
            };
            self.prices.write().insert(symbol.clone(), next);

            // persist the ticker before anyone is notified of the new price
            let now = unix_nanos();
            let ticker = match self.tickers.get_ticker(symbol) {
                Ok(Some(mut ticker)) => {
                    apply_tick(&mut ticker, price, now);
                    ticker
                }
                _ => Ticker::seeded(symbol.clone(), price, now),
            };
            if let Err(e) = self.tickers.update_ticker(&ticker) {
                warn!(%symbol, error = %e, "failed to persist ticker");
            }

            exchange.on_price(symbol, price);
            bus.publish(MarketEvent::ticker(ticker));
            if let Some(book) = exchange.order_book(symbol, 20) {
                bus.publish(MarketEvent::order_book(book));
            }
        }
    }

    /// Spawn the feed loop
    pub fn start(self: Arc<Self>, exchange: Arc<Exchange>, bus: Arc<EventBus>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(symbols = self.symbols.len(), "price feed started");
            let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
            let mut interval = tokio::time::interval(self.config.tick_interval);
            loop {
                interval.tick().await;
                self.tick_once(&mut rng, &exchange, &bus);
            }
        })
    }
}

/// Fold a new price into a ticker's 24h window
pub fn apply_tick(ticker: &mut Ticker, price: Price, now: i64) {
    let p = price.as_decimal();
    ticker.price = price;
    ticker.updated_at = now;

    if p > ticker.high_24h || ticker.high_24h == Decimal::ZERO {
        ticker.high_24h = p;
    }
    if p < ticker.low_24h || ticker.low_24h == Decimal::ZERO {
        ticker.low_24h = p;
    }

    // change is measured against the midpoint of the 24h range
    let baseline = (ticker.high_24h + ticker.low_24h) / Decimal::TWO;
    if baseline != Decimal::ZERO {
        ticker.change_24h = (p - baseline) / baseline * Decimal::ONE_HUNDRED;
    }
}

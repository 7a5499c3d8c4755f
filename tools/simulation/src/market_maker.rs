//! Market maker bot
//!
//! Keeps demo books liquid: every quote interval it places one bid below
//! and one ask above the feed price for each of its symbols, with a small
//! randomized size. Submissions go through the public coordinator
//! interface; rejections are logged and ignored.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use exchange::Exchange;
use types::ids::{Symbol, UserId};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderType, Side, TimeInForce};

use crate::pricefeed::PriceFeed;

#[derive(Debug, Clone)]
pub struct MarketMakerConfig {
    /// Half-spread is `mid × spread_bps / 20_000`
    pub spread_bps: u32,
    /// Base order size in the base asset; actual size is 1–2× this
    pub base_size: Decimal,
    pub quote_interval: Duration,
    pub seed: u64,
}

impl Default for MarketMakerConfig {
    fn default() -> Self {
        Self {
            spread_bps: 20,
            base_size: Decimal::new(1, 2), // 0.01
            quote_interval: Duration::from_secs(15),
            seed: 99,
        }
    }
}

/// Demo liquidity bot
pub struct MarketMaker {
    user_id: UserId,
    symbols: Vec<Symbol>,
    config: MarketMakerConfig,
}

impl MarketMaker {
    pub fn new(user_id: UserId, symbols: Vec<Symbol>, config: MarketMakerConfig) -> Self {
        Self {
            user_id,
            symbols,
            config,
        }
    }

    /// Bid and ask prices around a mid price
    pub fn quote_prices(&self, mid: Decimal) -> (Decimal, Decimal) {
        let half_spread = mid * Decimal::from(self.config.spread_bps) / Decimal::from(20_000);
        ((mid - half_spread).round_dp(2), (mid + half_spread).round_dp(2))
    }

    fn quote_size(&self, rng: &mut ChaCha8Rng) -> Decimal {
        let factor = Decimal::from_f64(1.0 + rng.gen::<f64>()).unwrap_or(Decimal::ONE);
        (self.config.base_size * factor).round_dp(6)
    }

    /// Place one bid and one ask per symbol at the current feed price
    pub fn quote_once(&self, rng: &mut ChaCha8Rng, exchange: &Exchange, feed: &PriceFeed) {
        for symbol in &self.symbols {
            let Some(mid) = feed.current_price(symbol) else {
                continue;
            };
            let (bid, ask) = self.quote_prices(mid);

            for (side, quote) in [(Side::BUY, bid), (Side::SELL, ask)] {
                let Some(price) = Price::try_new(quote) else {
                    continue;
                };
                let Some(quantity) = Quantity::try_new(self.quote_size(rng)) else {
                    continue;
                };
                let order = Order::new(
                    self.user_id.clone(),
                    symbol.clone(),
                    side,
                    OrderType::Limit,
                    quantity,
                    Some(price),
                    None,
                    TimeInForce::GTC,
                );
                if let Err(e) = exchange.submit(order) {
                    warn!(%symbol, error = %e, "market maker quote rejected");
                }
            }
        }
    }

    /// Spawn the quoting loop
    pub fn start(self, exchange: Arc<Exchange>, feed: Arc<PriceFeed>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(user = %self.user_id, symbols = self.symbols.len(), "market maker started");
            let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
            let mut interval = tokio::time::interval(self.config.quote_interval);
            loop {
                interval.tick().await;
                self.quote_once(&mut rng, &exchange, &feed);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricefeed::PriceFeedConfig;
    use market_data::EventBus;
    use persistence::MemoryStore;
    use types::book::Ticker;
    use types::store::OrderStore;

    fn harness() -> (Arc<Exchange>, Arc<PriceFeed>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.seed_ticker(Ticker::seeded(
            Symbol::new("BTC-USD"),
            Price::from_u64(50000),
            1,
        ));
        let bus = Arc::new(EventBus::default());
        let exchange = Arc::new(Exchange::new(
            store.clone(),
            store.clone(),
            store.clone(),
            bus,
        ));
        exchange.register_symbol(Symbol::new("BTC-USD"));
        let feed = Arc::new(PriceFeed::new(
            store.clone(),
            vec![Symbol::new("BTC-USD")],
            PriceFeedConfig::default(),
        ));
        (exchange, feed, store)
    }

    #[test]
    fn test_quote_prices_spread() {
        let mm = MarketMaker::new(
            UserId::from("user-3"),
            vec![],
            MarketMakerConfig {
                spread_bps: 20,
                ..Default::default()
            },
        );

        let (bid, ask) = mm.quote_prices(Decimal::from(50000));
        // half-spread = 50000 × 20 / 20000 = 50
        assert_eq!(bid, Decimal::from(49950));
        assert_eq!(ask, Decimal::from(50050));
        assert_eq!(ask - bid, Decimal::from(100));
    }

    #[test]
    fn test_quote_once_places_both_sides() {
        let (exchange, feed, store) = harness();
        let mm = MarketMaker::new(
            UserId::from("user-3"),
            vec![Symbol::new("BTC-USD")],
            MarketMakerConfig::default(),
        );
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        mm.quote_once(&mut rng, &exchange, &feed);

        let orders = store
            .get_orders_by_user(&UserId::from("user-3"), 10)
            .unwrap();
        assert_eq!(orders.len(), 2);
        assert!(orders.iter().any(|o| o.side == Side::BUY));
        assert!(orders.iter().any(|o| o.side == Side::SELL));
        // quotes straddle the feed price without crossing
        let book = exchange.order_book(&Symbol::new("BTC-USD"), 20).unwrap();
        assert_eq!(book.bids.len(), 1);
        assert_eq!(book.asks.len(), 1);
    }

    #[test]
    fn test_no_quotes_without_price() {
        let (exchange, _, store) = harness();
        // a feed that has no price for the bot's symbol
        let empty_feed = Arc::new(PriceFeed::new(
            store.clone(),
            vec![],
            PriceFeedConfig::default(),
        ));
        let mm = MarketMaker::new(
            UserId::from("user-3"),
            vec![Symbol::new("ETH-USD")],
            MarketMakerConfig::default(),
        );
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        mm.quote_once(&mut rng, &exchange, &empty_feed);

        assert!(store
            .get_orders_by_user(&UserId::from("user-3"), 10)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_quote_size_bounds() {
        let mm = MarketMaker::new(UserId::from("user-3"), vec![], MarketMakerConfig::default());
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..20 {
            let size = mm.quote_size(&mut rng);
            assert!(size >= Decimal::new(1, 2)); // >= base
            assert!(size <= Decimal::new(2, 2)); // <= 2× base
        }
    }
}

//! Order book snapshots and tickers
//!
//! Levels are derived views, aggregated on demand from resting orders;
//! nothing here is stored by the engine.

use crate::ids::Symbol;
use crate::numeric::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One aggregated price level of a book side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookLevel {
    pub price: Price,
    /// Sum of `remaining_qty` of all orders at this price
    pub quantity: Quantity,
    /// Number of resting orders at this price
    pub orders: u32,
}

/// Depth snapshot of both book sides, best levels first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    pub symbol: Symbol,
    pub bids: Vec<OrderBookLevel>,
    pub asks: Vec<OrderBookLevel>,
    pub timestamp: i64,
}

/// Rolling market statistics for one symbol
///
/// The core reads `price` to drive stop triggers; maintenance (the 24h
/// window math) is done by the price feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: Symbol,
    pub price: Price,
    pub high_24h: Decimal,
    pub low_24h: Decimal,
    pub volume_24h: Decimal,
    pub change_24h: Decimal,
    pub updated_at: i64,
}

impl Ticker {
    /// Seed a ticker at an initial price (high/low start at that price)
    pub fn seeded(symbol: Symbol, price: Price, timestamp: i64) -> Self {
        Self {
            symbol,
            price,
            high_24h: price.as_decimal(),
            low_24h: price.as_decimal(),
            volume_24h: Decimal::ZERO,
            change_24h: Decimal::ZERO,
            updated_at: timestamp,
        }
    }
}

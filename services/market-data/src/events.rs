//! Event model for the fan-out bus
//!
//! Wire shape is one JSON object per event:
//! `{"type": "orderbook"|"trade"|"ticker"|"order_update", "symbol"?, "data": …}`.
//! Only book snapshots carry the top-level symbol; the other payloads embed
//! theirs.

use serde::{Deserialize, Serialize};
use types::book::{OrderBookSnapshot, Ticker};
use types::ids::Symbol;
use types::order::Order;
use types::trade::Trade;

/// An event published to subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarketEvent {
    Orderbook { symbol: Symbol, data: OrderBookSnapshot },
    Trade { data: Trade },
    Ticker { data: Ticker },
    OrderUpdate { data: Order },
}

impl MarketEvent {
    pub fn order_book(snapshot: OrderBookSnapshot) -> Self {
        Self::Orderbook {
            symbol: snapshot.symbol.clone(),
            data: snapshot,
        }
    }

    pub fn trade(trade: Trade) -> Self {
        Self::Trade { data: trade }
    }

    pub fn ticker(ticker: Ticker) -> Self {
        Self::Ticker { data: ticker }
    }

    pub fn order_update(order: Order) -> Self {
        Self::OrderUpdate { data: order }
    }

    /// Event kind as a wire/logging label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Orderbook { .. } => "orderbook",
            Self::Trade { .. } => "trade",
            Self::Ticker { .. } => "ticker",
            Self::OrderUpdate { .. } => "order_update",
        }
    }
}

//! Trade execution types
//!
//! A trade is immutable once emitted by the engine; settlement and
//! persistence consume it but never modify it.

use crate::ids::{OrderId, Symbol, TradeId, UserId};
use crate::numeric::{Price, Quantity};
use crate::order::{Order, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single execution between two orders
///
/// `buy_order_id`/`sell_order_id` and `buyer_id`/`seller_id` are normalized
/// by side; `maker_order_id`/`taker_order_id` record which order was resting
/// and which was the aggressor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub symbol: Symbol,
    pub price: Price,
    pub quantity: Quantity,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub executed_at: i64,
}

impl Trade {
    /// Assemble a trade from the aggressor and the resting order it hit
    ///
    /// Execution price is the maker's price; buy/sell fields are normalized
    /// from the taker's side.
    pub fn between(
        taker: &Order,
        maker: &Order,
        price: Price,
        quantity: Quantity,
        executed_at: i64,
    ) -> Self {
        let (buy, sell) = match taker.side {
            Side::BUY => (taker, maker),
            Side::SELL => (maker, taker),
        };

        Self {
            id: TradeId::new(),
            symbol: taker.symbol.clone(),
            price,
            quantity,
            buy_order_id: buy.id,
            sell_order_id: sell.id,
            buyer_id: buy.user_id.clone(),
            seller_id: sell.user_id.clone(),
            maker_order_id: maker.id,
            taker_order_id: taker.id,
            executed_at,
        }
    }

    /// Trade value in the quote asset (price × quantity)
    pub fn value(&self) -> Decimal {
        self.quantity * self.price
    }
}

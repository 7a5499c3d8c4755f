//! Ask (sell-side) order book
//!
//! Sell orders sorted by price ascending (best ask first). Mirror of the
//! bid book with the iteration direction flipped.

use std::collections::BTreeMap;
use types::book::OrderBookLevel;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::Order;

use super::price_level::PriceLevel;

/// Sell side of the book
#[derive(Debug, Clone, Default)]
pub struct AskBook {
    levels: BTreeMap<Price, PriceLevel>,
}

impl AskBook {
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    /// Rest an order on the book
    pub fn insert(&mut self, order: Order) {
        let price = order.price.expect("resting order carries a limit price");
        self.levels.entry(price).or_default().push(order);
    }

    /// Lowest ask price
    pub fn best_price(&self) -> Option<Price> {
        self.levels.keys().next().copied()
    }

    /// The order at the top of the book (best price, earliest admission)
    pub fn best(&self) -> Option<&Order> {
        self.levels.values().next().and_then(|l| l.front())
    }

    pub fn level_mut(&mut self, price: Price) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&price)
    }

    /// Drop the level at `price` if it has no orders left
    pub fn prune(&mut self, price: Price) {
        if self.levels.get(&price).is_some_and(|l| l.is_empty()) {
            self.levels.remove(&price);
        }
    }

    /// Cancel path: scan all levels for an order id
    pub fn remove(&mut self, order_id: &OrderId) -> Option<Order> {
        let price = *self
            .levels
            .iter()
            .find(|(_, level)| level.iter().any(|o| &o.id == order_id))?
            .0;
        let removed = self.levels.get_mut(&price)?.remove(order_id);
        self.prune(price);
        removed
    }

    /// Price levels best-first (lowest price first)
    pub fn levels_best_first(&self) -> impl Iterator<Item = (&Price, &PriceLevel)> {
        self.levels.iter()
    }

    /// Top `depth` aggregated levels, best-first
    pub fn depth(&self, depth: usize) -> Vec<OrderBookLevel> {
        self.levels_best_first()
            .take(depth)
            .map(|(price, level)| OrderBookLevel {
                price: *price,
                quantity: Quantity::new(level.total()),
                orders: level.order_count() as u32,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Total resting orders across all levels
    pub fn order_count(&self) -> usize {
        self.levels.values().map(|l| l.order_count()).sum()
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.levels.values().flat_map(|l| l.iter())
    }
}

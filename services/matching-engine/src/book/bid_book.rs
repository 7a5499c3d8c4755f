//! Bid (buy-side) order book
//!
//! Buy orders sorted by price descending (best bid first). BTreeMap keys
//! give deterministic level order, so depth snapshots come out sorted
//! best-first with no explicit sort pass.

use std::collections::BTreeMap;
use types::book::OrderBookLevel;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::Order;

use super::price_level::PriceLevel;

/// Buy side of the book
#[derive(Debug, Clone, Default)]
pub struct BidBook {
    levels: BTreeMap<Price, PriceLevel>,
}

impl BidBook {
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

    /// Highest bid price
    pub fn best_price(&self) -> Option<Price> {
        self.levels.keys().next_back().copied()
    }

    /// The order at the top of the book (best price, earliest admission)
    pub fn best(&self) -> Option<&Order> {
        self.levels.values().next_back().and_then(|l| l.front())
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

    /// Price levels best-first (highest price first)
    pub fn levels_best_first(&self) -> impl Iterator<Item = (&Price, &PriceLevel)> {
        self.levels.iter().rev()
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

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::{Symbol, UserId};
    use types::order::{OrderType, Side, TimeInForce};

    fn order(price: u64, qty: &str) -> Order {
        Order::new(
            UserId::from("user-1"),
            Symbol::new("BTC-USD"),
            Side::BUY,
            OrderType::Limit,
            Quantity::from_str(qty).unwrap(),
            Some(Price::from_u64(price)),
            None,
            TimeInForce::GTC,
        )
    }

    #[test]
    fn test_best_is_highest_price() {
        let mut book = BidBook::new();
        book.insert(order(50000, "1.0"));
        book.insert(order(51000, "2.0"));
        book.insert(order(49000, "1.5"));

        assert_eq!(book.best_price(), Some(Price::from_u64(51000)));
        assert_eq!(
            book.best().unwrap().remaining_qty,
            Quantity::from_str("2.0").unwrap()
        );
    }

    #[test]
    fn test_depth_best_first() {
        let mut book = BidBook::new();
        book.insert(order(50000, "1.0"));
        book.insert(order(51000, "2.0"));
        book.insert(order(49000, "1.5"));
        book.insert(order(52000, "0.5"));

        let depth = book.depth(2);
        assert_eq!(depth.len(), 2);
        assert_eq!(depth[0].price, Price::from_u64(52000));
        assert_eq!(depth[1].price, Price::from_u64(51000));
    }

    #[test]
    fn test_depth_aggregates_level() {
        let mut book = BidBook::new();
        book.insert(order(50000, "1.0"));
        book.insert(order(50000, "2.0"));

        let depth = book.depth(10);
        assert_eq!(depth.len(), 1);
        assert_eq!(depth[0].quantity, Quantity::from_str("3.0").unwrap());
        assert_eq!(depth[0].orders, 2);
    }

    #[test]
    fn test_remove_by_id_prunes_level() {
        let mut book = BidBook::new();
        let target = order(50000, "1.0");
        let target_id = target.id;
        book.insert(target);

        assert!(book.remove(&target_id).is_some());
        assert!(book.is_empty());
        assert!(book.remove(&target_id).is_none());
    }

    #[test]
    fn test_remove_keeps_other_orders_at_level() {
        let mut book = BidBook::new();
        let target = order(50000, "1.0");
        let target_id = target.id;
        book.insert(target);
        book.insert(order(50000, "2.0"));

        assert!(book.remove(&target_id).is_some());
        assert_eq!(book.order_count(), 1);
        assert_eq!(book.best_price(), Some(Price::from_u64(50000)));
    }
}

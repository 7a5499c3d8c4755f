//! Price level with FIFO queue
//!
//! All resting orders at one price, in admission order. The engine assigns
//! `created_at` under its lock, so queue position is time priority.

use rust_decimal::Decimal;
use std::collections::VecDeque;
use types::ids::OrderId;
use types::numeric::Quantity;
use types::order::Order;

/// Resting orders at a single price, oldest first
#[derive(Debug, Clone, Default)]
pub struct PriceLevel {
    orders: VecDeque<Order>,
    /// Cached sum of remaining quantities
    total: Decimal,
}

impl PriceLevel {
    pub fn new() -> Self {
        Self {
            orders: VecDeque::new(),
            total: Decimal::ZERO,
        }
    }

    /// Queue an order at the back (latest admission, lowest priority)
    pub fn push(&mut self, order: Order) {
        self.total += order.remaining_qty.as_decimal();
        self.orders.push_back(order);
    }

    /// The order with time priority at this price
    pub fn front(&self) -> Option<&Order> {
        self.orders.front()
    }

    pub fn front_mut(&mut self) -> Option<&mut Order> {
        self.orders.front_mut()
    }

    /// Remove the front order
    pub fn pop_front(&mut self) -> Option<Order> {
        let order = self.orders.pop_front()?;
        self.total -= order.remaining_qty.as_decimal();
        Some(order)
    }

    /// Remove an order anywhere in the queue by id
    pub fn remove(&mut self, order_id: &OrderId) -> Option<Order> {
        let position = self.orders.iter().position(|o| &o.id == order_id)?;
        let order = self.orders.remove(position)?;
        self.total -= order.remaining_qty.as_decimal();
        Some(order)
    }

    /// Account for a fill against the front order
    ///
    /// The caller mutates the front order itself; this keeps the cached
    /// total in step.
    pub fn reduce(&mut self, qty: Quantity) {
        self.total -= qty.as_decimal();
    }

    /// Sum of remaining quantities at this price
    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }
}

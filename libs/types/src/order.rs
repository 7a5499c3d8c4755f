//! Order lifecycle types
//!
//! An order is created by a client, stamped at engine admission, and from
//! then on mutated only by the matching engine (fills, status, timestamps).
//! FILLED, CANCELLED and REJECTED are terminal.

use crate::ids::{OrderId, Symbol, UserId};
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    BUY,
    /// Sell order (ask)
    SELL,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::BUY => Side::SELL,
            Side::SELL => Side::BUY,
        }
    }
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Match at the limit price or better; GTC residuals rest on the book
    Limit,
    /// Match at any price; never rests
    Market,
    /// Parked until the stop price triggers, then submitted as a limit order
    StopLimit,
}

/// Time-in-force policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    /// Good-Till-Cancelled: rests until filled or cancelled
    GTC,
    /// Immediate-Or-Cancel: cross what is marketable, cancel the rest
    IOC,
    /// Fill-Or-Kill: reject entirely unless fully fillable at submission
    FOK,
}

impl Default for TimeInForce {
    fn default() -> Self {
        TimeInForce::GTC
    }
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Admitted, no fills yet
    Pending,
    /// Some quantity filled, some remaining
    Partial,
    /// Completely filled (terminal)
    Filled,
    /// Cancelled by user or engine (terminal)
    Cancelled,
    /// Failed validation or FOK feasibility (terminal)
    Rejected,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }
}

/// A client order
///
/// `created_at`/`updated_at` are Unix nanoseconds, assigned by the engine at
/// admission (not by the client) so the time-priority key is monotonic per
/// symbol. `filled_quantity + remaining_qty == quantity` at all times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub symbol: Symbol,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub quantity: Quantity,
    /// Limit price; absent for market orders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    /// Trigger price; only meaningful for stop-limit orders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<Price>,
    pub filled_quantity: Quantity,
    pub remaining_qty: Quantity,
    pub status: OrderStatus,
    pub time_in_force: TimeInForce,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// Create a new pending order
    ///
    /// Timestamps stay zero until the engine stamps them at admission.
    pub fn new(
        user_id: UserId,
        symbol: Symbol,
        side: Side,
        order_type: OrderType,
        quantity: Quantity,
        price: Option<Price>,
        stop_price: Option<Price>,
        time_in_force: TimeInForce,
    ) -> Self {
        Self {
            id: OrderId::new(),
            user_id,
            symbol,
            side,
            order_type,
            quantity,
            price,
            stop_price,
            filled_quantity: Quantity::zero(),
            remaining_qty: quantity,
            status: OrderStatus::Pending,
            time_in_force,
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Quantity invariant: filled + remaining = total
    pub fn check_invariant(&self) -> bool {
        self.filled_quantity.as_decimal() + self.remaining_qty.as_decimal()
            == self.quantity.as_decimal()
    }

    /// Check if order is completely filled
    pub fn is_filled(&self) -> bool {
        self.remaining_qty.is_zero()
    }

    /// Check if order has any fills
    pub fn has_fills(&self) -> bool {
        !self.filled_quantity.is_zero()
    }

    /// Record a fill and adjust status
    ///
    /// # Panics
    /// Panics if the fill would exceed the remaining quantity
    pub fn add_fill(&mut self, fill: Quantity, timestamp: i64) {
        assert!(
            fill.as_decimal() <= self.remaining_qty.as_decimal(),
            "Fill would exceed remaining quantity"
        );

        self.filled_quantity = self.filled_quantity + fill;
        self.remaining_qty = self.remaining_qty - fill;

        self.status = if self.is_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::Partial
        };
        self.updated_at = timestamp;

        assert!(self.check_invariant(), "Invariant violated after fill");
    }

    /// Cancel the order
    ///
    /// # Panics
    /// Panics if the order is already in a terminal state
    pub fn cancel(&mut self, timestamp: i64) {
        assert!(!self.status.is_terminal(), "Cannot cancel terminal order");
        self.status = OrderStatus::Cancelled;
        self.updated_at = timestamp;
    }

    /// Reject the order (validation or FOK feasibility failure)
    pub fn reject(&mut self, timestamp: i64) {
        assert!(!self.status.is_terminal(), "Cannot reject terminal order");
        self.status = OrderStatus::Rejected;
        self.updated_at = timestamp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order() -> Order {
        Order::new(
            UserId::from("user-1"),
            Symbol::new("BTC-USD"),
            Side::BUY,
            OrderType::Limit,
            Quantity::from_str("1.0").unwrap(),
            Some(Price::from_u64(50000)),
            None,
            TimeInForce::GTC,
        )
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::BUY.opposite(), Side::SELL);
        assert_eq!(Side::SELL.opposite(), Side::BUY);
    }

    #[test]
    fn test_order_creation() {
        let order = sample_order();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.remaining_qty, order.quantity);
        assert!(order.check_invariant());
        assert!(!order.has_fills());
    }

    #[test]
    fn test_order_fill_transitions() {
        let mut order = sample_order();

        order.add_fill(Quantity::from_str("0.3").unwrap(), 100);
        assert_eq!(order.status, OrderStatus::Partial);
        assert_eq!(order.updated_at, 100);
        assert!(order.check_invariant());

        order.add_fill(Quantity::from_str("0.7").unwrap(), 200);
        assert_eq!(order.status, OrderStatus::Filled);
        assert!(order.is_filled());
        assert!(order.status.is_terminal());
        assert!(order.check_invariant());
    }

    #[test]
    #[should_panic(expected = "Fill would exceed remaining quantity")]
    fn test_order_overfill_panics() {
        let mut order = sample_order();
        order.add_fill(Quantity::from_str("1.5").unwrap(), 100);
    }

    #[test]
    fn test_order_cancel() {
        let mut order = sample_order();
        order.cancel(100);
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert!(order.status.is_terminal());
    }

    #[test]
    #[should_panic(expected = "Cannot cancel terminal order")]
    fn test_cancel_terminal_panics() {
        let mut order = sample_order();
        order.add_fill(Quantity::from_str("1.0").unwrap(), 100);
        order.cancel(200);
    }

    #[test]
    fn test_wire_format() {
        let order = sample_order();
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["side"], "BUY");
        assert_eq!(json["type"], "LIMIT");
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["time_in_force"], "GTC");
        assert_eq!(json["price"], "50000");
        // absent stop price is omitted entirely
        assert!(json.get("stop_price").is_none());
    }

    #[test]
    fn test_stop_limit_wire_format() {
        let mut order = sample_order();
        order.order_type = OrderType::StopLimit;
        order.stop_price = Some(Price::from_u64(45000));

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["type"], "STOP_LIMIT");
        assert_eq!(json["stop_price"], "45000");
    }

    #[test]
    fn test_cancelled_wire_spelling() {
        let mut order = sample_order();
        order.cancel(100);
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["status"], "CANCELLED");
    }

    #[test]
    fn test_order_roundtrip() {
        let order = sample_order();
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, back);
    }
}

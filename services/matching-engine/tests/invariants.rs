//! Property tests over random order streams
//!
//! Whatever mix of marketable and passive limit orders arrives, the book
//! must never cross and quantity must be conserved: everything submitted is
//! either resting or was traded away (each trade consumes quantity from one
//! buy and one sell).

use matching_engine::MatchingEngine;
use proptest::prelude::*;
use rust_decimal::Decimal;
use types::ids::{Symbol, UserId};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderType, Side, TimeInForce};

fn limit_order(user: u8, side: Side, price: u32, qty: u32) -> Order {
    Order::new(
        UserId::new(format!("user-{user}")),
        Symbol::new("BTC-USD"),
        side,
        OrderType::Limit,
        Quantity::new(Decimal::from(qty)),
        Some(Price::new(Decimal::from(price))),
        None,
        TimeInForce::GTC,
    )
}

proptest! {
    #[test]
    fn book_never_crosses(
        ops in prop::collection::vec((any::<bool>(), 90u32..110, 1u32..10, 0u8..4), 1..100)
    ) {
        let engine = MatchingEngine::new(Symbol::new("BTC-USD"));
        for (is_buy, price, qty, user) in ops {
            let side = if is_buy { Side::BUY } else { Side::SELL };
            engine.submit(limit_order(user, side, price, qty));

            if let (Some(bid), Some(ask)) = (engine.best_bid(), engine.best_ask()) {
                prop_assert!(bid < ask, "crossed book: bid {bid} >= ask {ask}");
            }
        }
    }

    #[test]
    fn quantity_is_conserved(
        ops in prop::collection::vec((any::<bool>(), 90u32..110, 1u32..10, 0u8..4), 1..100)
    ) {
        let engine = MatchingEngine::new(Symbol::new("BTC-USD"));
        let mut submitted = Decimal::ZERO;
        for (is_buy, price, qty, user) in ops {
            let side = if is_buy { Side::BUY } else { Side::SELL };
            submitted += Decimal::from(qty);
            engine.submit(limit_order(user, side, price, qty));
        }

        let (trades, updates) = engine.drain_egress();
        let traded: Decimal = trades.iter().map(|t| t.quantity.as_decimal()).sum();
        let resting = engine.resting_quantity(Side::BUY).as_decimal()
            + engine.resting_quantity(Side::SELL).as_decimal();

        // each trade consumed its quantity on both sides
        prop_assert_eq!(submitted, resting + traded + traded);

        // every emitted order state satisfies filled + remaining = quantity
        for order in &updates {
            prop_assert!(order.check_invariant());
        }
    }
}

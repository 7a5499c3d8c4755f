//! Matching engine service
//!
//! One engine per symbol: a price-time priority limit order book with
//! market, limit and stop-limit orders.
//!
//! **Key invariants:**
//! - Price-time priority strictly enforced (better price first, earlier
//!   admission breaks ties)
//! - Best bid < best ask after every operation
//! - Conservation of quantity: every fill moves exactly its quantity on
//!   both sides
//! - Resting orders are always PENDING or PARTIAL with remaining quantity

pub mod book;
pub mod engine;

pub use engine::MatchingEngine;

//! Exchange coordinator
//!
//! Multiplexes symbols over per-symbol matching engines, drives post-trade
//! settlement through the balance collaborator, and republishes engine
//! egress onto the fan-out bus.

pub mod exchange;
pub mod settlement;

pub use exchange::Exchange;

//! Market data distribution
//!
//! The event model shared by all publishers and the fan-out bus that pushes
//! book snapshots, trades, tickers and order updates to subscribers.

pub mod bus;
pub mod events;

pub use bus::{EventBus, Subscription};
pub use events::MarketEvent;

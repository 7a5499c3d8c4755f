//! Demo market simulation
//!
//! A seeded random-walk price feed that maintains tickers and drives stop
//! triggers, and a market-maker bot that keeps the demo books liquid. Both
//! consume only the public coordinator interface.

pub mod market_maker;
pub mod pricefeed;

pub use market_maker::{MarketMaker, MarketMakerConfig};
pub use pricefeed::{PriceFeed, PriceFeedConfig};

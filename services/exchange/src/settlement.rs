//! Trade settlement
//!
//! Pure translation of a trade into balance mutations: the buyer pays
//! `price × quantity` of the quote asset and receives the base quantity,
//! the seller mirrors. Deltas sum to zero per asset, so applying a
//! settlement conserves total funds exactly.

use types::balance::{BalanceChange, Settlement};
use types::trade::Trade;

/// Build the four balance mutations for one trade
pub fn settlement_for(trade: &Trade) -> Settlement {
    let (base, quote) = trade.symbol.split();
    let value = trade.value();
    let quantity = trade.quantity.as_decimal();

    Settlement {
        trade_id: trade.id,
        entries: [
            BalanceChange {
                user_id: trade.buyer_id.clone(),
                asset: quote.to_string(),
                delta: -value,
            },
            BalanceChange {
                user_id: trade.buyer_id.clone(),
                asset: base.to_string(),
                delta: quantity,
            },
            BalanceChange {
                user_id: trade.seller_id.clone(),
                asset: quote.to_string(),
                delta: value,
            },
            BalanceChange {
                user_id: trade.seller_id.clone(),
                asset: base.to_string(),
                delta: -quantity,
            },
        ],
    }
}

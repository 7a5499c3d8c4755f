//! Per-symbol matching engine
//!
//! A single reader/writer lock guards both book sides, the stop wait-list
//! and the egress queues. `created_at` is stamped under that lock from a
//! strictly monotonic nanosecond clock, so it doubles as the time-priority
//! tiebreaker within the symbol.
//!
//! The lock is never held across calls out of the engine; the stop-trigger
//! path in particular releases it between selecting triggered orders and
//! re-submitting them, since resubmission re-enters the matching path.

use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use types::book::OrderBookSnapshot;
use types::ids::{OrderId, Symbol};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderType, Side, TimeInForce};
use types::trade::Trade;

use crate::book::{AskBook, BidBook, PriceLevel};

/// Wall clock in Unix nanoseconds
fn unix_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as i64
}

/// Everything the engine lock guards
struct EngineState {
    bids: BidBook,
    asks: AskBook,
    /// Parked stop-limit orders, FIFO
    stops: VecDeque<Order>,
    /// Egress: executed trades, oldest first
    trades: VecDeque<Trade>,
    /// Egress: order state changes, oldest first
    updates: VecDeque<Order>,
    /// Last timestamp handed out; admission stamps are strictly increasing
    last_ts: i64,
}

impl EngineState {
    fn next_timestamp(&mut self) -> i64 {
        let now = unix_nanos();
        let ts = if now > self.last_ts {
            now
        } else {
            self.last_ts + 1
        };
        self.last_ts = ts;
        ts
    }
}

/// Matching engine for a single symbol
pub struct MatchingEngine {
    symbol: Symbol,
    state: RwLock<EngineState>,
}

impl MatchingEngine {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            state: RwLock::new(EngineState {
                bids: BidBook::new(),
                asks: AskBook::new(),
                stops: VecDeque::new(),
                trades: VecDeque::new(),
                updates: VecDeque::new(),
                last_ts: 0,
            }),
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Admit an order: stamp its timestamps and dispatch by type
    ///
    /// Returns the admission snapshot (state of the order before any
    /// matching), which is what the client sees synchronously; fills arrive
    /// through the order-update queue.
    pub fn submit(&self, mut order: Order) -> Order {
        let mut state = self.state.write();
        let ts = state.next_timestamp();
        order.created_at = ts;
        order.updated_at = ts;
        let admitted = order.clone();

        match order.order_type {
            OrderType::StopLimit => {
                info!(
                    symbol = %self.symbol,
                    order_id = %order.id,
                    side = ?order.side,
                    stop_price = ?order.stop_price,
                    limit_price = ?order.price,
                    "stop-limit order parked"
                );
                state.stops.push_back(order);
            }
            OrderType::Market => Self::match_market(&mut state, order, &self.symbol),
            OrderType::Limit => Self::match_limit(&mut state, order, &self.symbol),
        }

        Self::assert_uncrossed(&state, &self.symbol);
        admitted
    }

    /// Match a limit order against the opposite side
    fn match_limit(state: &mut EngineState, mut order: Order, symbol: &Symbol) {
        let limit = order.price.expect("limit order carries a price");

        // FOK is all-or-nothing: probe the book before touching it
        if order.time_in_force == TimeInForce::FOK && !Self::fok_fillable(state, &order, limit) {
            let ts = state.next_timestamp();
            order.reject(ts);
            info!(symbol = %symbol, order_id = %order.id, "FOK order rejected, not fully fillable");
            state.updates.push_back(order);
            return;
        }

        match order.side {
            Side::BUY => Self::cross_buy(state, &mut order, symbol, Some(limit)),
            Side::SELL => Self::cross_sell(state, &mut order, symbol, Some(limit)),
        }

        if order.remaining_qty.is_zero() {
            return;
        }

        match order.time_in_force {
            TimeInForce::GTC => {
                // rest the residual; status is PENDING untouched, PARTIAL if filled
                state.updates.push_back(order.clone());
                match order.side {
                    Side::BUY => state.bids.insert(order),
                    Side::SELL => state.asks.insert(order),
                }
            }
            TimeInForce::IOC | TimeInForce::FOK => {
                let ts = state.next_timestamp();
                order.cancel(ts);
                state.updates.push_back(order);
            }
        }
    }

    /// Match a market order: same loop, no price test, never rests
    fn match_market(state: &mut EngineState, mut order: Order, symbol: &Symbol) {
        match order.side {
            Side::BUY => Self::cross_buy(state, &mut order, symbol, None),
            Side::SELL => Self::cross_sell(state, &mut order, symbol, None),
        }

        if !order.remaining_qty.is_zero() {
            let ts = state.next_timestamp();
            order.cancel(ts);
            info!(
                symbol = %symbol,
                order_id = %order.id,
                remaining = %order.remaining_qty,
                "market order residual cancelled, book exhausted"
            );
            state.updates.push_back(order);
        }
    }

    /// Cross an incoming buy against the asks while marketable
    fn cross_buy(state: &mut EngineState, order: &mut Order, symbol: &Symbol, limit: Option<Price>) {
        while !order.remaining_qty.is_zero() {
            let Some(top_price) = state.asks.best_price() else {
                break;
            };
            if limit.is_some_and(|l| l < top_price) {
                break;
            }
            let ts = state.next_timestamp();
            let level = state
                .asks
                .level_mut(top_price)
                .expect("best ask level exists");
            let exhausted = Self::fill_top(
                level,
                order,
                top_price,
                ts,
                symbol,
                &mut state.trades,
                &mut state.updates,
            );
            if exhausted {
                state.asks.prune(top_price);
            }
        }
    }

    /// Cross an incoming sell against the bids while marketable
    fn cross_sell(
        state: &mut EngineState,
        order: &mut Order,
        symbol: &Symbol,
        limit: Option<Price>,
    ) {
        while !order.remaining_qty.is_zero() {
            let Some(top_price) = state.bids.best_price() else {
                break;
            };
            if limit.is_some_and(|l| l > top_price) {
                break;
            }
            let ts = state.next_timestamp();
            let level = state
                .bids
                .level_mut(top_price)
                .expect("best bid level exists");
            let exhausted = Self::fill_top(
                level,
                order,
                top_price,
                ts,
                symbol,
                &mut state.trades,
                &mut state.updates,
            );
            if exhausted {
                state.bids.prune(top_price);
            }
        }
    }

    /// Execute one fill between the aggressor and the resting front order
    ///
    /// Trade price is the maker's; the trade is queued before both order
    /// updates so consumers always see the trade first. Returns whether the
    /// level is now empty.
    fn fill_top(
        level: &mut PriceLevel,
        order: &mut Order,
        price: Price,
        ts: i64,
        symbol: &Symbol,
        trades: &mut VecDeque<Trade>,
        updates: &mut VecDeque<Order>,
    ) -> bool {
        let maker = level.front_mut().expect("non-empty price level");
        let qty = order.remaining_qty.min(maker.remaining_qty);

        maker.add_fill(qty, ts);
        order.add_fill(qty, ts);
        let maker_snapshot = maker.clone();

        level.reduce(qty);
        if maker_snapshot.remaining_qty.is_zero() {
            level.pop_front();
        }

        let trade = Trade::between(order, &maker_snapshot, price, qty, ts);
        info!(
            symbol = %symbol,
            trade_id = %trade.id,
            price = %trade.price,
            quantity = %trade.quantity,
            maker_order_id = %trade.maker_order_id,
            taker_order_id = %trade.taker_order_id,
            "trade executed"
        );

        trades.push_back(trade);
        updates.push_back(order.clone());
        updates.push_back(maker_snapshot);

        level.is_empty()
    }

    /// Can this FOK order be completely filled at its limit right now?
    fn fok_fillable(state: &EngineState, order: &Order, limit: Price) -> bool {
        let needed = order.remaining_qty.as_decimal();
        let mut crossable = Decimal::ZERO;
        match order.side {
            Side::BUY => {
                for (price, level) in state.asks.levels_best_first() {
                    if *price > limit {
                        break;
                    }
                    crossable += level.total();
                    if crossable >= needed {
                        return true;
                    }
                }
            }
            Side::SELL => {
                for (price, level) in state.bids.levels_best_first() {
                    if *price < limit {
                        break;
                    }
                    crossable += level.total();
                    if crossable >= needed {
                        return true;
                    }
                }
            }
        }
        crossable >= needed
    }

    /// Trigger parked stop-limit orders against the latest price
    ///
    /// Selection happens under the lock; each triggered order is then
    /// re-submitted with the lock released in between, so the matching path
    /// never re-enters a held lock. Triggered orders keep their original
    /// `created_at`, so time priority dates from their admission. Stops
    /// parked while this runs wait for the next price tick.
    pub fn check_stops(&self, current_price: Price) {
        let triggered: Vec<Order> = {
            let mut state = self.state.write();
            let mut kept = VecDeque::with_capacity(state.stops.len());
            let mut fired = Vec::new();
            while let Some(order) = state.stops.pop_front() {
                let stop = order.stop_price.expect("parked stop carries a stop price");
                let hit = match order.side {
                    Side::BUY => current_price >= stop,
                    Side::SELL => current_price <= stop,
                };
                if hit {
                    fired.push(order);
                } else {
                    kept.push_back(order);
                }
            }
            state.stops = kept;
            fired
        };

        for mut order in triggered {
            info!(
                symbol = %self.symbol,
                order_id = %order.id,
                stop_price = ?order.stop_price,
                limit_price = ?order.price,
                current_price = %current_price,
                "stop-limit triggered, entering book as limit"
            );
            order.order_type = OrderType::Limit;
            let mut state = self.state.write();
            Self::match_limit(&mut state, order, &self.symbol);
            Self::assert_uncrossed(&state, &self.symbol);
        }
    }

    /// Cancel a resting or parked order
    ///
    /// Returns false when the id is not present (already terminal orders are
    /// never in the book, so a second cancel is a no-op).
    pub fn cancel(&self, order_id: &OrderId) -> bool {
        let mut state = self.state.write();

        let mut removed = state.bids.remove(order_id);
        if removed.is_none() {
            removed = state.asks.remove(order_id);
        }
        if removed.is_none() {
            if let Some(position) = state.stops.iter().position(|o| &o.id == order_id) {
                removed = state.stops.remove(position);
            }
        }

        match removed {
            Some(mut order) => {
                let ts = state.next_timestamp();
                order.cancel(ts);
                info!(symbol = %self.symbol, order_id = %order.id, "order cancelled");
                state.updates.push_back(order);
                true
            }
            None => false,
        }
    }

    /// Aggregated depth snapshot of both sides
    ///
    /// Best-effort consistency: taken between fills, never during one.
    pub fn snapshot(&self, depth: usize) -> OrderBookSnapshot {
        let state = self.state.read();
        OrderBookSnapshot {
            symbol: self.symbol.clone(),
            bids: state.bids.depth(depth),
            asks: state.asks.depth(depth),
            timestamp: unix_nanos(),
        }
    }

    /// Atomically drain both egress queues
    ///
    /// One lock acquisition for both, so a trade can never be drained later
    /// than the order updates it produced.
    pub fn drain_egress(&self) -> (Vec<Trade>, Vec<Order>) {
        let mut state = self.state.write();
        let trades = state.trades.drain(..).collect();
        let updates = state.updates.drain(..).collect();
        (trades, updates)
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.state.read().bids.best_price()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.state.read().asks.best_price()
    }

    /// Number of resting orders on both sides
    pub fn resting_orders(&self) -> usize {
        let state = self.state.read();
        state.bids.order_count() + state.asks.order_count()
    }

    /// Number of parked stop-limit orders
    pub fn parked_stops(&self) -> usize {
        self.state.read().stops.len()
    }

    /// Sum of remaining quantity resting on a side (test support)
    pub fn resting_quantity(&self, side: Side) -> Quantity {
        let state = self.state.read();
        let total = match side {
            Side::BUY => state
                .bids
                .orders()
                .map(|o| o.remaining_qty.as_decimal())
                .sum(),
            Side::SELL => state
                .asks
                .orders()
                .map(|o| o.remaining_qty.as_decimal())
                .sum(),
        };
        Quantity::try_new(total).unwrap_or(Quantity::zero())
    }

    fn assert_uncrossed(state: &EngineState, symbol: &Symbol) {
        if let (Some(bid), Some(ask)) = (state.bids.best_price(), state.asks.best_price()) {
            assert!(
                bid < ask,
                "book crossed for {symbol}: best bid {bid} >= best ask {ask}"
            );
        }
    }
}

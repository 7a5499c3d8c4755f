//! Many-to-many event fan-out
//!
//! Each subscriber gets its own bounded queue. Publication never blocks the
//! producer: a subscriber whose queue is full (or whose receiver is gone) is
//! evicted on the spot rather than backpressuring the matching path. Every
//! surviving subscriber sees events in publication order.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::events::MarketEvent;

/// Default per-subscriber queue capacity
pub const DEFAULT_CAPACITY: usize = 256;

/// Handle returned by [`EventBus::subscribe`]
///
/// Dropping the subscription closes the queue; the next publish evicts the
/// dead entry.
pub struct Subscription {
    id: u64,
    receiver: mpsc::Receiver<MarketEvent>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next event, in publication order; `None` once evicted or unsubscribed
    pub async fn recv(&mut self) -> Option<MarketEvent> {
        self.receiver.recv().await
    }

    /// Non-blocking variant for synchronous consumers and tests
    pub fn try_recv(&mut self) -> Option<MarketEvent> {
        self.receiver.try_recv().ok()
    }
}

/// The fan-out bus
pub struct EventBus {
    subscribers: Mutex<HashMap<u64, mpsc::Sender<MarketEvent>>>,
    next_id: AtomicU64,
    capacity: usize,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            capacity,
        }
    }

    /// Register a subscriber with a fresh bounded queue
    pub fn subscribe(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.capacity);
        self.subscribers.lock().insert(id, tx);
        debug!(subscriber = id, "subscriber registered");
        Subscription { id, receiver: rx }
    }

    /// Remove a subscriber; its queue is dropped
    pub fn unsubscribe(&self, id: u64) {
        if self.subscribers.lock().remove(&id).is_some() {
            debug!(subscriber = id, "subscriber removed");
        }
    }

    /// Deliver an event to every subscriber without blocking
    ///
    /// Subscribers that cannot take the event (queue full or receiver
    /// dropped) are evicted.
    pub fn publish(&self, event: MarketEvent) {
        let mut subscribers = self.subscribers.lock();
        let mut evicted = Vec::new();

        for (id, tx) in subscribers.iter() {
            if tx.try_send(event.clone()).is_err() {
                evicted.push(*id);
            }
        }

        for id in evicted {
            subscribers.remove(&id);
            warn!(subscriber = id, kind = event.kind(), "evicting slow subscriber");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::book::{OrderBookSnapshot, Ticker};
    use types::ids::Symbol;
    use types::numeric::Price;

    fn book_event(ts: i64) -> MarketEvent {
        MarketEvent::order_book(OrderBookSnapshot {
            symbol: Symbol::new("BTC-USD"),
            bids: vec![],
            asks: vec![],
            timestamp: ts,
        })
    }

    #[tokio::test]
    async fn test_subscriber_receives_in_order() {
        let bus = EventBus::default();
        let mut sub = bus.subscribe();

        bus.publish(book_event(1));
        bus.publish(book_event(2));
        bus.publish(book_event(3));

        for expected in 1..=3 {
            match sub.recv().await.unwrap() {
                MarketEvent::Orderbook { data, .. } => assert_eq!(data.timestamp, expected),
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_all_subscribers_see_same_stream() {
        let bus = EventBus::default();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(book_event(1));
        bus.publish(MarketEvent::ticker(Ticker::seeded(
            Symbol::new("BTC-USD"),
            Price::from_u64(45000),
            2,
        )));

        assert_eq!(a.recv().await.unwrap().kind(), "orderbook");
        assert_eq!(a.recv().await.unwrap().kind(), "ticker");
        assert_eq!(b.recv().await.unwrap().kind(), "orderbook");
        assert_eq!(b.recv().await.unwrap().kind(), "ticker");
    }

    #[tokio::test]
    async fn test_slow_subscriber_evicted_not_blocking() {
        let bus = EventBus::new(2);
        let _slow = bus.subscribe();
        let mut fast = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        // fill the slow queue, then overflow it; publish must not block
        bus.publish(book_event(1));
        bus.publish(book_event(2));
        for _ in 0..2 {
            fast.try_recv().unwrap();
        }
        bus.publish(book_event(3));

        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(fast.try_recv().unwrap().kind(), "orderbook");
    }

    #[tokio::test]
    async fn test_dropped_subscription_evicted_on_publish() {
        let bus = EventBus::default();
        let sub = bus.subscribe();
        drop(sub);

        bus.publish(book_event(1));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_unsubscribe_closes_queue() {
        let bus = EventBus::default();
        let mut sub = bus.subscribe();
        bus.unsubscribe(sub.id());

        assert_eq!(bus.subscriber_count(), 0);
        assert!(sub.recv().await.is_none());
    }
}

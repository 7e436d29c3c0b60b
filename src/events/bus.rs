//! # Event bus for broadcasting table transitions.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking publishing from multiple sources (seat workers, the arena,
//! the subscriber fan-out).
//!
//! ```text
//! Publishers (many):                Consumer (one):
//!   Worker 0 ──┐
//!   Worker 1 ──┼──────► Bus ──────► arena fan-out listener ──► SubscriberSet
//!   Worker N ──┤  (broadcast chan)
//!   Arena    ──┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks or awaits.
//! - **Bounded capacity**: one ring buffer stores recent events for all
//!   receivers; receivers that lag skip the oldest items.
//! - **No persistence**: events sent while no receiver exists are dropped.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for table events.
///
/// Cheap to clone (internally an `Arc`-backed sender); every worker carries
/// its own handle.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// Returns immediately; if nobody is listening, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver observing subsequent events.
    ///
    /// A receiver only sees events sent **after** it subscribes; slow
    /// receivers observe `RecvError::Lagged(n)` and skip `n` items.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn delivers_in_publish_order() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(Event::new(EventKind::Resumed).with_seat(0));
        bus.publish(Event::new(EventKind::Paused).with_seat(1));

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.kind, EventKind::Resumed);
        assert_eq!(second.kind, EventKind::Paused);
        assert!(first.seq < second.seq);
    }

    #[tokio::test]
    async fn publish_without_receivers_is_silent() {
        let bus = Bus::new(4);
        bus.publish(Event::new(EventKind::Resumed));
        // a receiver created afterwards starts from the next event
        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::Paused));
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::Paused);
    }
}

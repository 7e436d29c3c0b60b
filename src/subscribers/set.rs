//! # Non-blocking event fan-out to subscribers.
//!
//! [`SubscriberSet`] distributes events to every subscriber concurrently
//! without ever blocking the publisher — the property behind the core's
//! promise to never wait for a renderer to finish drawing.
//!
//! ```text
//! emit_arc(event)
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!     │    (bounded)         └─────► panic → SubscriberPanicked
//!     ├──► [queue 2] ──► worker 2 ──► subscriber2.on_event()
//!     └──► [queue N] ──► worker N ──► subscriberN.on_event()
//! ```
//!
//! ## Rules
//! - `emit_arc` uses `try_send`: a full queue drops the event for that
//!   subscriber only and publishes `SubscriberOverflow` back onto the bus.
//! - No cross-subscriber ordering; per-subscriber delivery is FIFO.
//! - Panics are isolated with `catch_unwind`; the worker keeps running.
//! - Overflow events that themselves overflow are not re-reported.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event};
use crate::subscribers::Subscribe;

/// Per-subscriber delivery lane.
struct Lane {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Fan-out coordinator for the registered subscribers.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates the set and spawns one worker task per subscriber.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut lanes = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));
            let report_bus = bus.clone();

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = sub.on_event(ev.as_ref());
                    if let Err(payload) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        report_bus.publish(Event::subscriber_panicked(
                            sub.name(),
                            panic_message(payload.as_ref()),
                        ));
                    }
                }
            });
            lanes.push(Lane { name, tx });
            workers.push(handle);
        }
        Self {
            lanes,
            workers,
            bus,
        }
    }

    /// Emits a pre-allocated event to all subscribers without blocking.
    ///
    /// A full or closed lane drops the event for that subscriber and reports
    /// `SubscriberOverflow`, except when the event being emitted is itself an
    /// overflow report.
    pub fn emit_arc(&self, event: Arc<Event>) {
        let is_overflow = event.is_subscriber_overflow();

        for lane in &self.lanes {
            match lane.tx.try_send(Arc::clone(&event)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    if !is_overflow {
                        self.bus.publish(Event::subscriber_overflow(lane.name, "full"));
                    }
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    if !is_overflow {
                        self.bus
                            .publish(Event::subscriber_overflow(lane.name, "closed"));
                    }
                }
            }
        }
    }

    /// Emits a borrowed event (clones it once).
    pub fn emit(&self, event: &Event) {
        self.emit_arc(Arc::new(event.clone()));
    }

    /// Gracefully drains the lanes and joins the workers.
    pub async fn shutdown(self) {
        drop(self.lanes);
        for handle in self.workers {
            let _ = handle.await;
        }
    }
}

/// Best-effort extraction of a panic payload's message.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Counter {
        seen: AtomicUsize,
    }

    #[async_trait]
    impl Subscribe for Counter {
        async fn on_event(&self, _event: &Event) {
            self.seen.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &'static str {
            "counter"
        }
    }

    struct Bomb;

    #[async_trait]
    impl Subscribe for Bomb {
        async fn on_event(&self, _event: &Event) {
            panic!("boom");
        }

        fn name(&self) -> &'static str {
            "bomb"
        }
    }

    struct Stuck;

    #[async_trait]
    impl Subscribe for Stuck {
        async fn on_event(&self, _event: &Event) {
            std::future::pending::<()>().await;
        }

        fn name(&self) -> &'static str {
            "stuck"
        }

        fn queue_capacity(&self) -> usize {
            1
        }
    }

    #[tokio::test]
    async fn delivers_to_every_subscriber() {
        let bus = Bus::new(64);
        let a = Arc::new(Counter {
            seen: AtomicUsize::new(0),
        });
        let b = Arc::new(Counter {
            seen: AtomicUsize::new(0),
        });
        let set = SubscriberSet::new(vec![a.clone(), b.clone()], bus);

        for _ in 0..3 {
            set.emit_arc(Arc::new(Event::new(EventKind::Resumed)));
        }
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(a.seen.load(Ordering::SeqCst), 3);
        assert_eq!(b.seen.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn panicking_subscriber_is_isolated() {
        let bus = Bus::new(64);
        let mut reports = bus.subscribe();
        let healthy = Arc::new(Counter {
            seen: AtomicUsize::new(0),
        });
        let set = SubscriberSet::new(vec![Arc::new(Bomb) as _, healthy.clone() as _], bus);

        set.emit_arc(Arc::new(Event::new(EventKind::Resumed)));
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(healthy.seen.load(Ordering::SeqCst), 1);
        let report = reports.recv().await.unwrap();
        assert_eq!(report.kind, EventKind::SubscriberPanicked);
        assert!(report.reason.as_deref().unwrap().contains("boom"));
    }

    #[tokio::test]
    async fn full_queue_drops_for_that_subscriber_only() {
        let bus = Bus::new(64);
        let mut reports = bus.subscribe();
        let healthy = Arc::new(Counter {
            seen: AtomicUsize::new(0),
        });
        let set = SubscriberSet::new(vec![Arc::new(Stuck) as _, healthy.clone() as _], bus);

        // no await between emits: the stuck lane's single slot fills on the
        // first one and the rest must overflow
        for _ in 0..3 {
            set.emit_arc(Arc::new(Event::new(EventKind::Resumed)));
        }
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(healthy.seen.load(Ordering::SeqCst), 3);
        let report = reports.recv().await.unwrap();
        assert_eq!(report.kind, EventKind::SubscriberOverflow);
        assert!(report.reason.as_deref().unwrap().contains("stuck"));
    }
}

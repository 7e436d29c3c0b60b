//! # Event subscriber trait.
//!
//! [`Subscribe`] is the extension point for anything that wants to watch the
//! table: renderers, loggers, metrics, test recorders.
//!
//! Each subscriber gets a dedicated bounded queue and worker task, so a slow
//! or panicking subscriber affects only itself. Events arrive in FIFO order
//! per subscriber, and every delivered event carries the table snapshot taken
//! right after the transition it describes — a renderer needs nothing else.

use async_trait::async_trait;

use crate::events::Event;

/// Observer of table transitions.
///
/// ### Implementation requirements
/// - Use async I/O; never block the executor.
/// - Handle errors internally; a panic is caught and reported as
///   `SubscriberPanicked`, and the worker moves on to the next event.
/// - Slow processing fills only this subscriber's queue; once full, further
///   events are dropped for this subscriber (`SubscriberOverflow`).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from the subscriber's own worker task, never from a seat
    /// worker or the arena.
    async fn on_event(&self, event: &Event);

    /// Short name used in overflow/panic reports.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Queue capacity for this subscriber (clamped to a minimum of 1).
    ///
    /// The default suits a renderer that keeps up at interactive rates;
    /// recorders that must not miss anything should raise it.
    fn queue_capacity(&self) -> usize {
        256
    }
}

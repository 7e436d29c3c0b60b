//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to transitions emitted by the arena, the seat workers,
//! and the subscriber fan-out workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] — event classification and payload metadata
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Arena` (control transitions, forced fork recovery,
//!   shutdown milestones), `Worker` (phase and fork transitions, seat
//!   lifecycle), `SubscriberSet` workers (overflow/panic).
//! - **Consumer**: the arena's fan-out listener, which applies each event to
//!   the table view, attaches the refreshed snapshot, and hands it to the
//!   subscriber set.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};

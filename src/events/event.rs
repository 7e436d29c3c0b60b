//! # Runtime events emitted by the arena and its seat workers.
//!
//! The [`EventKind`] enum classifies transitions across four categories:
//! - **Control events**: the operator's run/pause/reset actions
//! - **Table transitions**: phase changes, fork traffic, seat lifecycle
//! - **Shutdown events**: quit requested, stopped within grace, grace blown
//! - **Subscriber events**: fan-out overflow and panic reports
//!
//! The [`Event`] struct carries the metadata for a transition: which seat,
//! which fork, which phase, plus a wall-clock timestamp and a monotonic
//! sequence number.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically with creation order. The table view uses `seq` to reject
//! stale updates when delivery order and creation order disagree.
//!
//! ## Example
//! ```
//! use symposium::{Event, EventKind, Phase};
//!
//! let ev = Event::new(EventKind::PhaseChanged)
//!     .with_seat(2)
//!     .with_phase(Phase::Eating);
//!
//! assert_eq!(ev.kind, EventKind::PhaseChanged);
//! assert_eq!(ev.seat, Some(2));
//! assert_eq!(ev.phase, Some(Phase::Eating));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::core::{Phase, RunState, TableSnapshot};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Control events ===
    /// Operator started (or restarted) the simulation.
    ///
    /// Sets: `state = Running`.
    Resumed,

    /// Operator paused the simulation. Held forks survive a pause.
    ///
    /// Sets: `state = Paused`.
    Paused,

    /// Operator reset the table. Workers abandon their cycles; the arena
    /// reclaims every fork.
    ///
    /// Sets: `state = Reset`.
    ResetIssued,

    // === Table transitions ===
    /// A seat worker changed phase.
    ///
    /// Sets: `seat`, `phase`.
    PhaseChanged,

    /// A fork was acquired.
    ///
    /// Sets: `fork`, `seat` (the new holder).
    ForkTaken,

    /// A fork was put back by its holder (end of eating, or back-off after a
    /// failed grab of the second fork).
    ///
    /// Sets: `fork`, `seat` (the previous holder).
    ForkDropped,

    /// A fork was reclaimed by the arena during a reset, regardless of
    /// holder.
    ///
    /// Sets: `fork`.
    ForkForcedFree,

    /// A seat worker's task started.
    ///
    /// Sets: `seat`, `phase` (initial, Thinking).
    SeatJoined,

    /// A seat worker's task exited (shutdown).
    ///
    /// Sets: `seat`.
    SeatRetired,

    // === Shutdown events ===
    /// Shutdown requested (OS signal or explicit quit).
    ShutdownRequested,

    /// All seat workers stopped within the configured grace window.
    AllStoppedWithin,

    /// Grace window exceeded; some workers were still live.
    GraceExceeded,

    // === Subscriber events ===
    /// A subscriber's queue was full or closed; an event was dropped for that
    /// subscriber only.
    ///
    /// Sets: `reason`.
    SubscriberOverflow,

    /// A subscriber panicked while processing an event.
    ///
    /// Sets: `reason`.
    SubscriberPanicked,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
/// - `snapshot`: attached by the arena's fan-out listener before delivery,
///   so every event a subscriber sees carries the post-transition table state
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Seat index, if applicable.
    pub seat: Option<usize>,
    /// Fork index, if applicable.
    pub fork: Option<usize>,
    /// Worker phase, for phase and lifecycle events.
    pub phase: Option<Phase>,
    /// Run state, for control events.
    pub state: Option<RunState>,
    /// Human-readable reason (overflow details, panic messages).
    pub reason: Option<Arc<str>>,
    /// Post-transition table snapshot; `None` on the raw bus, populated on
    /// delivery to subscribers.
    pub snapshot: Option<Arc<TableSnapshot>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            seat: None,
            fork: None,
            phase: None,
            state: None,
            reason: None,
            snapshot: None,
        }
    }

    /// Attaches a seat index.
    #[inline]
    pub fn with_seat(mut self, seat: usize) -> Self {
        self.seat = Some(seat);
        self
    }

    /// Attaches a fork index.
    #[inline]
    pub fn with_fork(mut self, fork: usize) -> Self {
        self.fork = Some(fork);
        self
    }

    /// Attaches a worker phase.
    #[inline]
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    /// Attaches a run state.
    #[inline]
    pub fn with_state(mut self, state: RunState) -> Self {
        self.state = Some(state);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a table snapshot.
    #[inline]
    pub fn with_snapshot(mut self, snapshot: Arc<TableSnapshot>) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, cause: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} cause={cause}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} panic={info}"))
    }

    /// True for the overflow events produced by the fan-out itself.
    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}

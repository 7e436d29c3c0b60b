//! # Table state tracker fed by bus events.
//!
//! [`TableView`] maintains the authoritative picture of the table — run
//! state, per-seat phase, per-fork holder, live seats — by applying events in
//! sequence order. The arena's fan-out listener updates it on every event and
//! attaches the refreshed [`TableSnapshot`] before delivery, so renderers
//! never reach into the core's concurrency state.
//!
//! ```text
//! Workers / Arena ──► Bus ──► fan-out listener ──► TableView::apply()
//!                                                        │
//!                                                        ▼
//!                                            TableSnapshot (per event)
//! ```
//!
//! ## Rules
//! - Events with a sequence number at or below the last one seen for that
//!   slot are rejected as stale.
//! - Reads are eventually consistent with the bus; the snapshot attached to
//!   an event reflects the table *after* that event.

use std::sync::{PoisonError, RwLock};

use crate::core::coordinator::RunState;
use crate::core::worker::Phase;
use crate::events::{Event, EventKind};

/// One seat in a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeatView {
    /// Ring index of the seat.
    pub seat: usize,
    /// Current phase; map to a display color via [`Phase::color`].
    pub phase: Phase,
}

/// One fork in a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForkView {
    /// Ring index of the fork (its position hint: between seat `fork - 1`
    /// and seat `fork`).
    pub fork: usize,
    /// Seat currently holding it, if any.
    pub holder: Option<usize>,
}

/// Immutable picture of the whole table at one instant.
#[derive(Clone, Debug)]
pub struct TableSnapshot {
    /// Operator run state.
    pub state: RunState,
    /// All seats, indexed by ring position.
    pub seats: Vec<SeatView>,
    /// All forks, indexed by ring position.
    pub forks: Vec<ForkView>,
}

impl TableSnapshot {
    /// Phase of the given seat, if it exists.
    pub fn seat_phase(&self, seat: usize) -> Option<Phase> {
        self.seats.get(seat).map(|s| s.phase)
    }

    /// Holder of the given fork, if it exists and is held.
    pub fn fork_holder(&self, fork: usize) -> Option<usize> {
        self.forks.get(fork).and_then(|f| f.holder)
    }
}

struct SeatSlot {
    last_seq: u64,
    phase: Phase,
    live: bool,
}

struct ForkSlot {
    last_seq: u64,
    holder: Option<usize>,
}

struct ViewInner {
    state: RunState,
    state_seq: u64,
    seats: Vec<SeatSlot>,
    forks: Vec<ForkSlot>,
}

/// Event-fed tracker of table state.
pub(crate) struct TableView {
    inner: RwLock<ViewInner>,
}

impl TableView {
    /// Creates a view for a ring of `seats` seats (and as many forks),
    /// everything free and Thinking, run state Paused.
    pub(crate) fn new(seats: usize) -> Self {
        Self {
            inner: RwLock::new(ViewInner {
                state: RunState::Paused,
                state_seq: 0,
                seats: (0..seats)
                    .map(|_| SeatSlot {
                        last_seq: 0,
                        phase: Phase::Thinking,
                        live: false,
                    })
                    .collect(),
                forks: (0..seats)
                    .map(|_| ForkSlot {
                        last_seq: 0,
                        holder: None,
                    })
                    .collect(),
            }),
        }
    }

    /// Applies one event; returns whether it changed anything.
    ///
    /// Stale events (seq at or below the slot's last seen) and events
    /// referencing unknown seats/forks are ignored.
    pub(crate) fn apply(&self, ev: &Event) -> bool {
        let mut g = self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match ev.kind {
            EventKind::Resumed | EventKind::Paused | EventKind::ResetIssued => {
                if ev.seq <= g.state_seq && g.state_seq != 0 {
                    return false;
                }
                g.state_seq = ev.seq;
                g.state = match ev.kind {
                    EventKind::Resumed => RunState::Running,
                    EventKind::Paused => RunState::Paused,
                    _ => RunState::Reset,
                };
                true
            }
            EventKind::PhaseChanged => {
                let Some(phase) = ev.phase else { return false };
                Self::seat_slot(&mut g, ev).map_or(false, |slot| {
                    slot.phase = phase;
                    true
                })
            }
            EventKind::SeatJoined => Self::seat_slot(&mut g, ev).map_or(false, |slot| {
                slot.live = true;
                slot.phase = ev.phase.unwrap_or(Phase::Thinking);
                true
            }),
            EventKind::SeatRetired => Self::seat_slot(&mut g, ev).map_or(false, |slot| {
                slot.live = false;
                true
            }),
            EventKind::ForkTaken => Self::fork_slot(&mut g, ev).map_or(false, |slot| {
                slot.holder = ev.seat;
                true
            }),
            EventKind::ForkDropped | EventKind::ForkForcedFree => {
                Self::fork_slot(&mut g, ev).map_or(false, |slot| {
                    slot.holder = None;
                    true
                })
            }
            _ => false,
        }
    }

    /// Current run state as the view has observed it.
    pub(crate) fn run_state(&self) -> RunState {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .state
    }

    /// Materializes the current table state.
    pub(crate) fn snapshot(&self) -> TableSnapshot {
        let g = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        TableSnapshot {
            state: g.state,
            seats: g
                .seats
                .iter()
                .enumerate()
                .map(|(i, s)| SeatView {
                    seat: i,
                    phase: s.phase,
                })
                .collect(),
            forks: g
                .forks
                .iter()
                .enumerate()
                .map(|(i, f)| ForkView {
                    fork: i,
                    holder: f.holder,
                })
                .collect(),
        }
    }

    /// Seats whose worker task has joined and not yet retired.
    pub(crate) fn live_seats(&self) -> Vec<usize> {
        let g = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        g.seats
            .iter()
            .enumerate()
            .filter(|(_, s)| s.live)
            .map(|(i, _)| i)
            .collect()
    }

    /// Seq-guarded access to a seat slot.
    fn seat_slot<'a>(g: &'a mut ViewInner, ev: &Event) -> Option<&'a mut SeatSlot> {
        let slot = g.seats.get_mut(ev.seat?)?;
        if ev.seq <= slot.last_seq && slot.last_seq != 0 {
            return None;
        }
        slot.last_seq = ev.seq;
        Some(slot)
    }

    /// Seq-guarded access to a fork slot.
    fn fork_slot<'a>(g: &'a mut ViewInner, ev: &Event) -> Option<&'a mut ForkSlot> {
        let slot = g.forks.get_mut(ev.fork?)?;
        if ev.seq <= slot.last_seq && slot.last_seq != 0 {
            return None;
        }
        slot.last_seq = ev.seq;
        Some(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_paused_free_and_thinking() {
        let view = TableView::new(5);
        let snap = view.snapshot();
        assert_eq!(snap.state, RunState::Paused);
        assert_eq!(snap.seats.len(), 5);
        assert_eq!(snap.forks.len(), 5);
        assert!(snap.seats.iter().all(|s| s.phase == Phase::Thinking));
        assert!(snap.forks.iter().all(|f| f.holder.is_none()));
    }

    #[test]
    fn tracks_phase_and_fork_traffic() {
        let view = TableView::new(3);
        assert!(view.apply(&Event::new(EventKind::Resumed)));
        assert!(view.apply(
            &Event::new(EventKind::PhaseChanged)
                .with_seat(1)
                .with_phase(Phase::Hungry)
        ));
        assert!(view.apply(&Event::new(EventKind::ForkTaken).with_fork(1).with_seat(1)));

        let snap = view.snapshot();
        assert_eq!(snap.state, RunState::Running);
        assert_eq!(snap.seat_phase(1), Some(Phase::Hungry));
        assert_eq!(snap.fork_holder(1), Some(1));

        assert!(view.apply(&Event::new(EventKind::ForkForcedFree).with_fork(1)));
        assert_eq!(view.snapshot().fork_holder(1), None);
    }

    #[test]
    fn stale_events_are_rejected() {
        let view = TableView::new(2);
        let earlier = Event::new(EventKind::PhaseChanged)
            .with_seat(0)
            .with_phase(Phase::Eating);
        let later = Event::new(EventKind::PhaseChanged)
            .with_seat(0)
            .with_phase(Phase::Hungry);
        assert!(later.seq > earlier.seq);

        // delivered out of creation order: the late arrival must not win
        assert!(view.apply(&later));
        assert!(!view.apply(&earlier), "stale seq must not overwrite");
        assert_eq!(view.snapshot().seat_phase(0), Some(Phase::Hungry));
    }

    #[test]
    fn unknown_indices_are_ignored() {
        let view = TableView::new(2);
        assert!(!view.apply(
            &Event::new(EventKind::PhaseChanged)
                .with_seat(9)
                .with_phase(Phase::Eating)
        ));
        assert!(!view.apply(&Event::new(EventKind::ForkTaken).with_fork(7).with_seat(0)));
    }

    #[test]
    fn live_seats_follow_join_and_retire() {
        let view = TableView::new(3);
        view.apply(&Event::new(EventKind::SeatJoined).with_seat(0).with_phase(Phase::Thinking));
        view.apply(&Event::new(EventKind::SeatJoined).with_seat(2).with_phase(Phase::Thinking));
        assert_eq!(view.live_seats(), vec![0, 2]);

        view.apply(&Event::new(EventKind::SeatRetired).with_seat(0));
        assert_eq!(view.live_seats(), vec![2]);
    }
}

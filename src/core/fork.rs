//! # Fork: binary mutual-exclusion unit with a non-blocking probe.
//!
//! A [`Fork`] is a single holder slot backed by an `AtomicUsize`. The probe,
//! [`Fork::try_acquire`], is a compare-and-set: it either claims a free fork
//! or reports failure immediately, never blocking the caller. The worker's
//! back-off protocol depends on that immediacy — a blocking acquire would
//! reintroduce the circular wait this design exists to break.
//!
//! The atomic is also what enforces the core invariant: at most one seat
//! holds a fork at any instant, because only one CAS can win the transition
//! from free.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Sentinel for "no holder". Seat indices are small, so the collision is
/// theoretical.
const FREE: usize = usize::MAX;

/// One fork in the ring, shared by two adjacent seats.
#[derive(Debug)]
pub struct Fork {
    index: usize,
    holder: AtomicUsize,
}

impl Fork {
    /// Creates a free fork with the given ring index.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            holder: AtomicUsize::new(FREE),
        }
    }

    /// Returns the fork's ring index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Non-blocking probe: claims the fork for `seat` iff it is currently
    /// free. Returns whether the claim succeeded.
    pub fn try_acquire(&self, seat: usize) -> bool {
        debug_assert_ne!(seat, FREE);
        self.holder
            .compare_exchange(FREE, seat, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Puts the fork back. Only the current holder may call this; a mismatch
    /// (possible when a reset already reclaimed the fork) leaves the slot
    /// untouched.
    pub fn release(&self, seat: usize) {
        let _ = self
            .holder
            .compare_exchange(seat, FREE, Ordering::AcqRel, Ordering::Acquire);
    }

    /// Unconditionally frees the fork, regardless of holder. Used only by the
    /// arena during a reset to recover forks from cancelled workers.
    pub fn force_free(&self) {
        self.holder.store(FREE, Ordering::Release);
    }

    /// Returns the current holder, if any.
    pub fn holder(&self) -> Option<usize> {
        match self.holder.load(Ordering::Acquire) {
            FREE => None,
            seat => Some(seat),
        }
    }

    /// True when nobody holds the fork.
    pub fn is_free(&self) -> bool {
        self.holder().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn acquire_release_cycle() {
        let fork = Fork::new(0);
        assert!(fork.is_free());

        assert!(fork.try_acquire(3));
        assert_eq!(fork.holder(), Some(3));

        // the other adjacent seat loses the probe without blocking
        assert!(!fork.try_acquire(4));
        assert_eq!(fork.holder(), Some(3));

        fork.release(3);
        assert!(fork.is_free());
        assert!(fork.try_acquire(4));
    }

    #[test]
    fn force_free_overrides_any_holder() {
        let fork = Fork::new(2);
        assert!(fork.try_acquire(2));
        fork.force_free();
        assert!(fork.is_free());
        // idempotent on a free fork
        fork.force_free();
        assert!(fork.is_free());
    }

    #[test]
    fn contended_probe_has_exactly_one_winner() {
        let fork = Arc::new(Fork::new(0));
        for round in 0..200 {
            let handles: Vec<_> = (0..4)
                .map(|seat| {
                    let f = Arc::clone(&fork);
                    std::thread::spawn(move || f.try_acquire(seat))
                })
                .collect();
            let wins = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|won| *won)
                .count();
            assert_eq!(wins, 1, "round {round}: expected exactly one winner");
            fork.force_free();
        }
    }
}

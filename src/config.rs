//! # Global table configuration.
//!
//! Provides [`TableConfig`], the centralized settings for one simulated table.
//!
//! The config is consumed once, by [`Arena::new`](crate::Arena::new), which
//! validates it before building the fork ring and seat workers.
//!
//! ## Field semantics
//! - `seats`: ring size; seat `i` shares fork `i` with its left neighbour and
//!   fork `(i + 1) % seats` with its right neighbour
//! - `think` / `fumble` / `eat`: nominal phase durations, each jittered per
//!   [`JitterPolicy`] before every use
//! - `bus_capacity`: event bus ring buffer size (min 1; clamped)
//! - `grace`: maximum wait for workers to stop during shutdown

use std::time::Duration;

use crate::error::SimError;
use crate::policies::{JitterPolicy, PhaseTiming};

/// Configuration for a simulated table.
///
/// All fields are public for flexibility; [`TableConfig::validate`] is the
/// authority on what combinations are acceptable.
#[derive(Clone, Debug)]
pub struct TableConfig {
    /// Number of seats (and forks) in the ring.
    ///
    /// The classic demonstration uses 5. Any value `>= 2` builds a valid
    /// ring; the adjacency rule is the only thing that depends on it.
    pub seats: usize,

    /// Nominal duration of the Thinking phase.
    pub think: Duration,

    /// Nominal duration of the Hungry phase (the fumble before reaching for
    /// the first fork).
    pub fumble: Duration,

    /// Nominal duration of the Eating phase.
    pub eat: Duration,

    /// Randomized variation applied to every delay.
    pub jitter: JitterPolicy,

    /// Capacity of the event bus broadcast ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` events skip
    /// the oldest items. Minimum value is 1 (clamped).
    pub bus_capacity: usize,

    /// Maximum time to wait for seat workers to stop during shutdown.
    pub grace: Duration,
}

impl TableConfig {
    /// Checks that this configuration describes a valid table.
    ///
    /// Rejects rings smaller than 2 (a single seat would hold both ends of
    /// the same fork) and zero-length phase durations.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.seats < 2 {
            return Err(SimError::InvalidConfig {
                reason: format!("ring needs at least 2 seats, got {}", self.seats),
            });
        }
        for (name, d) in [
            ("think", self.think),
            ("fumble", self.fumble),
            ("eat", self.eat),
        ] {
            if d.is_zero() {
                return Err(SimError::InvalidConfig {
                    reason: format!("{name} duration must be positive"),
                });
            }
        }
        Ok(())
    }

    /// Bundles the phase durations and jitter into a [`PhaseTiming`] for a
    /// seat worker.
    pub fn timing(&self) -> PhaseTiming {
        PhaseTiming {
            think: self.think,
            fumble: self.fumble,
            eat: self.eat,
            jitter: self.jitter,
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for TableConfig {
    /// Default configuration, matching the classic demonstration:
    ///
    /// - `seats = 5`
    /// - `think = 4s`, `fumble = 2s`, `eat = 3s`
    /// - `jitter = ±20%`
    /// - `bus_capacity = 1024`
    /// - `grace = 5s`
    fn default() -> Self {
        Self {
            seats: 5,
            think: Duration::from_secs(4),
            fumble: Duration::from_secs(2),
            eat: Duration::from_secs(3),
            jitter: JitterPolicy::default(),
            bus_capacity: 1024,
            grace: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(TableConfig::default().validate().is_ok());
    }

    #[test]
    fn single_seat_ring_rejected() {
        let cfg = TableConfig {
            seats: 1,
            ..TableConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.as_label(), "sim_invalid_config");
    }

    #[test]
    fn zero_phase_duration_rejected() {
        let cfg = TableConfig {
            eat: Duration::ZERO,
            ..TableConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn bus_capacity_clamped_to_one() {
        let cfg = TableConfig {
            bus_capacity: 0,
            ..TableConfig::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}

//! # Jitter policy for phase delays.
//!
//! [`JitterPolicy`] adds bounded randomness to the nominal phase durations so
//! the five workers drift apart instead of marching in lockstep through their
//! cycles.
//!
//! A policy with fraction `f` draws each delay uniformly from
//! `[(1 - f) * nominal, (1 + f) * nominal]`, then floors the result at 1 ms
//! so a tiny nominal can never round down to a zero-length (or negative)
//! sleep.

use rand::Rng;
use std::time::Duration;

/// Shortest delay the policy will ever hand out.
const FLOOR: Duration = Duration::from_millis(1);

/// Bounded randomized variation applied to nominal delays.
///
/// The fraction is clamped to `[0.0, 0.95]` at construction; a fraction of
/// `1.0` or more would allow a zero lower bound and defeat the floor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JitterPolicy {
    fraction: f64,
}

impl Default for JitterPolicy {
    /// Returns the classic ±20% policy.
    fn default() -> Self {
        Self { fraction: 0.2 }
    }
}

impl JitterPolicy {
    /// Creates a policy with the given fraction, clamped to `[0.0, 0.95]`.
    pub fn new(fraction: f64) -> Self {
        Self {
            fraction: if fraction.is_finite() {
                fraction.clamp(0.0, 0.95)
            } else {
                0.0
            },
        }
    }

    /// Returns the configured fraction.
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Draws a concrete delay for the given nominal duration.
    ///
    /// A zero fraction returns the nominal unchanged (useful for
    /// deterministic tests). The result is never shorter than 1 ms.
    pub fn apply(&self, nominal: Duration) -> Duration {
        if self.fraction == 0.0 {
            return nominal.max(FLOOR);
        }
        let ms = nominal.as_millis().min(u128::from(u64::MAX)) as u64;
        if ms == 0 {
            return FLOOR;
        }
        let spread = (ms as f64 * self.fraction) as u64;
        if spread == 0 {
            return Duration::from_millis(ms);
        }
        let lo = ms.saturating_sub(spread);
        let hi = ms.saturating_add(spread);
        let drawn = rand::rng().random_range(lo..=hi);
        Duration::from_millis(drawn.max(1))
    }
}

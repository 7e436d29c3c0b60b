//! Error types used by the symposium runtime and seat workers.
//!
//! Two kinds of things can go "wrong" here, and only one of them is an error
//! in the usual sense:
//!
//! - [`Cancelled`] — the cooperative signal raised when the operator resets
//!   the table. Every suspension point in a worker can observe it; the worker
//!   loop catches it, returns the seat to Thinking, and keeps running. It is
//!   never fatal.
//! - [`SimError`] — errors raised by the simulation runtime itself: a
//!   configuration that cannot describe a valid table, or a shutdown that
//!   exceeded its grace window.
//!
//! Failing to grab a fork is neither: acquisition failure is an expected
//! outcome of the non-blocking probe and is reported as a plain `bool`.

use std::time::Duration;
use thiserror::Error;

/// Cooperative cancellation signal delivered on table reset.
///
/// Raised from a worker's suspension points (the interruptible delay and the
/// run gate) when a reset is observed. The worker's top-level loop recovers
/// from it; fork recovery is the arena's job, not the cancelled worker's.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cycle cancelled by table reset")]
pub struct Cancelled;

/// # Errors produced by the simulation runtime.
///
/// Nothing that happens mid-simulation is fatal; these cover the edges of the
/// lifecycle (construction and shutdown).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SimError {
    /// The configuration cannot describe a valid table.
    #[error("invalid table configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with it.
        reason: String,
    },

    /// Shutdown grace window was exceeded; some seat workers were still live.
    #[error("shutdown grace {grace:?} exceeded; seats still live: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Seat indices that did not stop in time.
        stuck: Vec<usize>,
    },
}

impl SimError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use symposium::SimError;
    /// use std::time::Duration;
    ///
    /// let err = SimError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "sim_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SimError::InvalidConfig { .. } => "sim_invalid_config",
            SimError::GraceExceeded { .. } => "sim_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SimError::InvalidConfig { reason } => format!("invalid config: {reason}"),
            SimError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck seats={stuck:?}")
            }
        }
    }
}

//! # Coordinator: process-wide run-state with broadcast wake-up.
//!
//! The [`Coordinator`] holds the operator-controlled run state — Paused,
//! Running, or Reset — in a [`tokio::sync::watch`] channel. The channel is
//! the whole synchronization story: its sender side serializes transitions,
//! and every state change wakes every worker parked on a receiver, with the
//! happens-before edge the workers rely on to observe the new state.
//!
//! Each seat worker carries a [`RunGate`], its private receiver handle, and
//! consults it at exactly two kinds of suspension point:
//!
//! - [`RunGate::checkpoint`] — the cooperative gate at phase boundaries.
//!   Passes straight through while Running; otherwise parks the worker until
//!   the operator acts.
//! - [`RunGate::shifted`] — completes on the next state transition. Timed
//!   delays race against it so a pause or reset lands mid-sleep instead of
//!   after it.
//!
//! ```text
//!                pause()  ┌────────┐  resume()
//!            ┌───────────►│ Paused │◄──────────┐ (initial)
//!            │            └───┬────┘           │
//!        ┌───┴─────┐          │ reset()    ┌───┴────┐
//!        │ Running │          ▼            │ Paused │
//!        └───▲─────┘      ┌───────┐        └────────┘
//!            └────────────┤ Reset │
//!              resume()   └───────┘
//! ```
//!
//! A gate that observes Reset while waiting — or finds one it has not yet
//! observed — reports [`Cancelled`]; re-entered after that, it parks until
//! the next resume, so cancelled workers quiesce instead of spinning.

use tokio::sync::watch;

use crate::error::Cancelled;

/// Operator-controlled run state of the whole table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Workers park at their next checkpoint. Held forks survive. Initial
    /// state.
    Paused,
    /// Workers cycle freely.
    Running,
    /// Workers abandon their current cycle; the arena reclaims all forks.
    /// Cleared by the next resume.
    Reset,
}

/// Process-wide run-state holder. One instance per table, owned by the
/// arena; workers interact through [`RunGate`] handles.
#[derive(Debug)]
pub struct Coordinator {
    tx: watch::Sender<RunState>,
}

impl Coordinator {
    /// Creates a coordinator in the initial Paused state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(RunState::Paused);
        Self { tx }
    }

    /// Returns the current run state.
    pub fn state(&self) -> RunState {
        *self.tx.borrow()
    }

    /// Transitions to Paused. Workers notice at their next suspension point.
    pub fn pause(&self) {
        self.tx.send_replace(RunState::Paused);
    }

    /// Transitions to Running and wakes every parked worker.
    pub fn resume(&self) {
        self.tx.send_replace(RunState::Running);
    }

    /// Transitions to Reset and wakes every parked worker.
    pub fn reset(&self) {
        self.tx.send_replace(RunState::Reset);
    }

    /// Creates a new gate handle for one worker.
    pub fn gate(&self) -> RunGate {
        RunGate {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-worker handle onto the coordinator's state channel.
///
/// Each worker owns its gate exclusively; the methods take `&mut self`
/// because observing a transition consumes the channel's change flag.
#[derive(Debug)]
pub struct RunGate {
    rx: watch::Receiver<RunState>,
}

impl RunGate {
    /// Returns the current run state without consuming the change flag.
    pub fn state(&self) -> RunState {
        *self.rx.borrow()
    }

    /// The cooperative gate at phase boundaries.
    ///
    /// - Running: returns `Ok(false)` immediately.
    /// - Paused or Reset: parks until a transition lands. Waking to Running
    ///   returns `Ok(true)` — the caller owes a compensating delay. Observing
    ///   Reset while parked reports `Err(Cancelled)`.
    ///
    /// A reset that landed since this gate last looked — while the worker was
    /// running straight-line code between suspension points — is surfaced as
    /// `Err(Cancelled)` here rather than silently parked on, so the worker
    /// still rewinds its cycle.
    pub async fn checkpoint(&mut self) -> Result<bool, Cancelled> {
        let unseen = self.rx.has_changed().unwrap_or(false);
        match *self.rx.borrow_and_update() {
            RunState::Running => return Ok(false),
            RunState::Reset if unseen => return Err(Cancelled),
            RunState::Paused | RunState::Reset => {}
        }
        loop {
            self.changed().await;
            match *self.rx.borrow_and_update() {
                RunState::Running => return Ok(true),
                RunState::Reset => return Err(Cancelled),
                RunState::Paused => {}
            }
        }
    }

    /// Completes on the next run-state transition and returns the new state.
    ///
    /// This is the interruption primitive for timed delays: a sleep raced
    /// against `shifted()` gets cut short the moment the operator acts.
    pub async fn shifted(&mut self) -> RunState {
        self.changed().await;
        *self.rx.borrow_and_update()
    }

    /// Awaits the next change. A closed channel means the coordinator is
    /// gone; the gate parks forever and leaves teardown to the worker's
    /// cancellation token.
    async fn changed(&mut self) {
        if self.rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn checkpoint_passes_through_while_running() {
        let coord = Coordinator::new();
        coord.resume();
        let mut gate = coord.gate();
        assert_eq!(gate.checkpoint().await, Ok(false));
    }

    #[tokio::test(start_paused = true)]
    async fn checkpoint_parks_until_resume() {
        let coord = Coordinator::new();
        let mut gate = coord.gate();

        let parked = tokio::spawn(async move { gate.checkpoint().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!parked.is_finished(), "gate should park while Paused");

        coord.resume();
        assert_eq!(parked.await.unwrap(), Ok(true));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_a_parked_gate() {
        let coord = Coordinator::new();
        let mut gate = coord.gate();

        let parked = tokio::spawn(async move { gate.checkpoint().await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        coord.reset();
        assert_eq!(parked.await.unwrap(), Err(Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn gate_entered_during_reset_waits_for_resume() {
        let coord = Coordinator::new();
        coord.reset();
        let mut gate = coord.gate();

        let parked = tokio::spawn(async move { gate.checkpoint().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!parked.is_finished(), "gate should park while Reset");

        coord.resume();
        assert_eq!(parked.await.unwrap(), Ok(true));
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_pause_keeps_gate_parked() {
        let coord = Coordinator::new();
        let mut gate = coord.gate();

        let parked = tokio::spawn(async move { gate.checkpoint().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        coord.pause();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!parked.is_finished());

        coord.resume();
        assert_eq!(parked.await.unwrap(), Ok(true));
    }

    #[tokio::test(start_paused = true)]
    async fn unobserved_reset_cancels_at_gate_entry() {
        let coord = Coordinator::new();
        coord.resume();
        let mut gate = coord.gate();
        assert_eq!(gate.checkpoint().await, Ok(false));

        // the reset lands while the worker runs straight-line code
        coord.reset();
        assert_eq!(gate.checkpoint().await, Err(Cancelled));

        // observed once, the same reset now parks the gate until resume
        let parked = tokio::spawn(async move { gate.checkpoint().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!parked.is_finished());
        coord.resume();
        assert_eq!(parked.await.unwrap(), Ok(true));
    }

    #[tokio::test]
    async fn shifted_reports_the_new_state() {
        let coord = Coordinator::new();
        let mut gate = coord.gate();
        coord.resume();
        assert_eq!(gate.shifted().await, RunState::Running);
        coord.pause();
        assert_eq!(gate.shifted().await, RunState::Paused);
    }
}

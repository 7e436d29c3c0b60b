//! # Worker: the per-seat four-phase state machine.
//!
//! One [`Worker`] runs per seat, as a plain async task driven by the arena's
//! `JoinSet` — the state machine lives in the struct, not in the concurrency
//! primitive. A cycle walks Thinking → Hungry → (maybe) Eating and back,
//! consulting the run gate at every phase boundary:
//!
//! ```text
//! loop {
//!   ├─► gate; if it parked us, delay(eat/2)      ── compensating delay
//!   ├─► Thinking: delay(think ± jitter)
//!   ├─► gate; if parked, delay(think/2)
//!   ├─► Hungry: delay(fumble ± jitter)
//!   ├─► gate; if parked, delay(fumble/2)
//!   ├─► grab forks (once):
//!   │     try_acquire(left) ── fail ─► empty-handed this cycle
//!   │     └─ ok ─► yield ─► try_acquire(right)
//!   │                        └─ fail ─► put left back        ── back-off
//!   └─► Eating (only with both forks): delay(eat ± jitter),
//!       then drop left, yield, drop right
//! }
//! ```
//!
//! The single acquisition attempt per Hungry phase is deliberate: a worker
//! that comes up empty simply thinks again and retries next cycle. The
//! back-off is the deadlock-avoidance core: nobody ever holds one fork while
//! waiting indefinitely for the other, so no circular wait chain can close.
//!
//! ## Cancellation
//! Any delay or gate can observe a reset and report [`Cancelled`]. The
//! worker's loop catches it, returns the seat to Thinking, and clears its own
//! bookkeeping — it does **not** release forks. Fork recovery is centralized
//! in the arena, which force-frees the whole ring; letting a cancelled worker
//! clean up as well would race that recovery.
//!
//! ## Pause
//! Pause is cooperative, not cancelling. A worker parked mid-delay re-enters
//! the gate, and on resume restarts the sleep at **half** the originally
//! drawn duration, so the table does not stall for a full phase right after
//! the operator hits run.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::core::coordinator::{RunGate, RunState};
use crate::core::fork::Fork;
use crate::error::Cancelled;
use crate::events::{Bus, Event, EventKind};
use crate::policies::PhaseTiming;

/// Phase of one seat's cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Holding no forks, waiting out the think delay.
    Thinking,
    /// Fumbling before reaching for the first fork.
    Hungry,
    /// Holding both adjacent forks.
    Eating,
}

impl Phase {
    /// Display color for renderers, matching the classic demonstration.
    pub fn color(&self) -> SeatColor {
        match self {
            Phase::Thinking => SeatColor::Blue,
            Phase::Hungry => SeatColor::Red,
            Phase::Eating => SeatColor::Green,
        }
    }
}

/// Display color a phase maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatColor {
    Blue,
    Red,
    Green,
}

/// The state machine for one seat.
pub(crate) struct Worker {
    seat: usize,
    left: Arc<Fork>,
    right: Arc<Fork>,
    gate: RunGate,
    bus: Bus,
    timing: PhaseTiming,
    phase: Phase,
    holds_left: bool,
    holds_right: bool,
}

impl Worker {
    pub(crate) fn new(
        seat: usize,
        left: Arc<Fork>,
        right: Arc<Fork>,
        gate: RunGate,
        bus: Bus,
        timing: PhaseTiming,
    ) -> Self {
        Self {
            seat,
            left,
            right,
            gate,
            bus,
            timing,
            phase: Phase::Thinking,
            holds_left: false,
            holds_right: false,
        }
    }

    /// Runs the worker until its token is cancelled (shutdown).
    ///
    /// A reset is not an exit condition: the cycle reports [`Cancelled`], the
    /// loop rewinds the seat to Thinking, and the next cycle parks at the
    /// gate until the operator resumes.
    pub(crate) async fn run(mut self, token: CancellationToken) {
        self.bus.publish(
            Event::new(EventKind::SeatJoined)
                .with_seat(self.seat)
                .with_phase(self.phase),
        );
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                res = self.cycle() => {
                    if res.is_err() {
                        self.rewind();
                    }
                }
            }
        }
        self.bus
            .publish(Event::new(EventKind::SeatRetired).with_seat(self.seat));
    }

    /// One full pass of the state machine.
    ///
    /// Each gate is followed, when it parked us, by a compensating delay of
    /// half the phase the pause most recently cut short: eat before the cycle
    /// top, think before hunger, fumble before eating.
    async fn cycle(&mut self) -> Result<(), Cancelled> {
        self.pass_gate(self.timing.eat).await?;
        self.think().await?;
        self.pass_gate(self.timing.think).await?;
        self.hunger().await?;
        self.pass_gate(self.timing.fumble).await?;
        self.grab_forks().await;
        self.eat().await?;
        Ok(())
    }

    /// Consults the gate; if it parked, serves half of `interrupted` before
    /// continuing.
    async fn pass_gate(&mut self, interrupted: Duration) -> Result<(), Cancelled> {
        if self.gate.checkpoint().await? {
            self.delay(interrupted / 2).await?;
        }
        Ok(())
    }

    async fn think(&mut self) -> Result<(), Cancelled> {
        self.set_phase(Phase::Thinking);
        self.delay(self.timing.think).await
    }

    async fn hunger(&mut self) -> Result<(), Cancelled> {
        self.set_phase(Phase::Hungry);
        self.delay(self.timing.fumble).await
    }

    /// The acquisition protocol, attempted exactly once per cycle.
    ///
    /// The yield between the two probes is deliberate and load-bearing: it
    /// hands the scheduler a window in which the neighbour can contend, which
    /// is what keeps the simulation honest about the race it demonstrates.
    async fn grab_forks(&mut self) {
        if !self.left.try_acquire(self.seat) {
            return;
        }
        self.holds_left = true;
        self.publish_fork(EventKind::ForkTaken, self.left.index());

        tokio::task::yield_now().await;

        if self.right.try_acquire(self.seat) {
            self.holds_right = true;
            self.publish_fork(EventKind::ForkTaken, self.right.index());
        } else {
            // back-off: never sit on one fork while the other is taken
            self.holds_left = false;
            self.publish_fork(EventKind::ForkDropped, self.left.index());
            self.left.release(self.seat);
        }
    }

    /// Eats only with both forks in hand; otherwise the cycle ends
    /// empty-handed and the seat thinks again.
    async fn eat(&mut self) -> Result<(), Cancelled> {
        if !(self.holds_left && self.holds_right) {
            return Ok(());
        }
        self.set_phase(Phase::Eating);
        self.delay(self.timing.eat).await?;

        // drop events go out before the slot is actually freed, so a
        // neighbour's take can never carry an older sequence number
        self.holds_left = false;
        self.publish_fork(EventKind::ForkDropped, self.left.index());
        self.left.release(self.seat);

        tokio::task::yield_now().await;

        self.holds_right = false;
        self.publish_fork(EventKind::ForkDropped, self.right.index());
        self.right.release(self.seat);
        Ok(())
    }

    /// Interruptible, jittered sleep.
    ///
    /// A pause mid-sleep parks the worker at the gate; on resume the sleep
    /// restarts at half the originally drawn duration. A reset reports
    /// [`Cancelled`].
    async fn delay(&mut self, nominal: Duration) -> Result<(), Cancelled> {
        let full = self.timing.draw(nominal);
        let mut duration = full;
        loop {
            let sleep = time::sleep(duration);
            tokio::pin!(sleep);
            loop {
                tokio::select! {
                    _ = &mut sleep => return Ok(()),
                    state = self.gate.shifted() => match state {
                        RunState::Reset => return Err(Cancelled),
                        RunState::Paused => {
                            self.gate.checkpoint().await?;
                            duration = full / 2;
                            break;
                        }
                        RunState::Running => {}
                    },
                }
            }
        }
    }

    /// Cancellation recovery: back to Thinking, own bookkeeping cleared.
    /// Forks are reclaimed centrally by the arena, never here.
    fn rewind(&mut self) {
        self.holds_left = false;
        self.holds_right = false;
        self.set_phase(Phase::Thinking);
    }

    fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.bus.publish(
            Event::new(EventKind::PhaseChanged)
                .with_seat(self.seat)
                .with_phase(phase),
        );
    }

    fn publish_fork(&self, kind: EventKind, fork: usize) {
        self.bus
            .publish(Event::new(kind).with_fork(fork).with_seat(self.seat));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coordinator::Coordinator;
    use crate::policies::JitterPolicy;
    use tokio::time::Instant;

    fn timing_ms(think: u64, fumble: u64, eat: u64) -> PhaseTiming {
        PhaseTiming {
            think: Duration::from_millis(think),
            fumble: Duration::from_millis(fumble),
            eat: Duration::from_millis(eat),
            jitter: JitterPolicy::new(0.0),
        }
    }

    fn worker_at(seat: usize, left: &Arc<Fork>, right: &Arc<Fork>, coord: &Coordinator) -> Worker {
        Worker::new(
            seat,
            Arc::clone(left),
            Arc::clone(right),
            coord.gate(),
            Bus::new(64),
            timing_ms(20, 10, 15),
        )
    }

    #[tokio::test]
    async fn backs_off_when_right_fork_is_taken() {
        let coord = Coordinator::new();
        coord.resume();
        let left = Arc::new(Fork::new(0));
        let right = Arc::new(Fork::new(1));
        assert!(right.try_acquire(1)); // the neighbour got there first

        let mut w = worker_at(0, &left, &right, &coord);
        w.grab_forks().await;

        assert!(!w.holds_left && !w.holds_right);
        assert!(left.is_free(), "left fork must be put back");
        assert_eq!(right.holder(), Some(1));
    }

    #[tokio::test]
    async fn stays_empty_handed_when_left_fork_is_taken() {
        let coord = Coordinator::new();
        coord.resume();
        let left = Arc::new(Fork::new(0));
        let right = Arc::new(Fork::new(1));
        assert!(left.try_acquire(4));

        let mut w = worker_at(0, &left, &right, &coord);
        w.grab_forks().await;

        assert!(!w.holds_left && !w.holds_right);
        assert!(right.is_free(), "right fork must never be probed");
    }

    #[tokio::test(start_paused = true)]
    async fn eating_releases_both_forks_in_sequence() {
        let coord = Coordinator::new();
        coord.resume();
        let left = Arc::new(Fork::new(2));
        let right = Arc::new(Fork::new(3));

        let mut w = worker_at(2, &left, &right, &coord);
        w.grab_forks().await;
        assert!(w.holds_left && w.holds_right);
        assert_eq!(left.holder(), Some(2));
        assert_eq!(right.holder(), Some(2));

        w.eat().await.unwrap();
        assert_eq!(w.phase, Phase::Eating);
        assert!(!w.holds_left && !w.holds_right);
        assert!(left.is_free() && right.is_free());
    }

    #[tokio::test(start_paused = true)]
    async fn skips_eating_without_both_forks() {
        let coord = Coordinator::new();
        coord.resume();
        let left = Arc::new(Fork::new(0));
        let right = Arc::new(Fork::new(1));
        assert!(right.try_acquire(1));

        let mut w = worker_at(0, &left, &right, &coord);
        w.grab_forks().await;
        let before = Instant::now();
        w.eat().await.unwrap();
        assert_eq!(before.elapsed(), Duration::ZERO, "no eat delay should run");
        assert_ne!(w.phase, Phase::Eating);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_mid_delay_resumes_with_half_duration() {
        let coord = Coordinator::new();
        coord.resume();
        let left = Arc::new(Fork::new(0));
        let right = Arc::new(Fork::new(1));
        let mut w = Worker::new(
            0,
            left,
            right,
            coord.gate(),
            Bus::new(64),
            timing_ms(100, 10, 15),
        );

        let start = Instant::now();
        let handle = tokio::spawn(async move {
            w.delay(Duration::from_millis(100)).await.unwrap();
        });

        tokio::time::sleep(Duration::from_millis(30)).await;
        coord.pause();
        tokio::time::sleep(Duration::from_millis(500)).await;
        coord.resume();
        handle.await.unwrap();

        // 30ms slept + 500ms paused + 50ms (half of the drawn 100ms)
        let elapsed = start.elapsed();
        assert!(
            elapsed >= Duration::from_millis(575) && elapsed <= Duration::from_millis(590),
            "elapsed {elapsed:?} not within the half-duration resume window"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reset_mid_delay_cancels() {
        let coord = Coordinator::new();
        coord.resume();
        let left = Arc::new(Fork::new(0));
        let right = Arc::new(Fork::new(1));
        let mut w = worker_at(0, &left, &right, &coord);

        let handle = tokio::spawn(async move { w.delay(Duration::from_millis(100)).await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        coord.reset();
        assert_eq!(handle.await.unwrap(), Err(Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn rewind_clears_bookkeeping_but_not_forks() {
        let coord = Coordinator::new();
        coord.resume();
        let left = Arc::new(Fork::new(0));
        let right = Arc::new(Fork::new(1));
        let mut w = worker_at(0, &left, &right, &coord);

        w.grab_forks().await;
        assert!(w.holds_left && w.holds_right);

        w.rewind();
        assert!(!w.holds_left && !w.holds_right);
        assert_eq!(w.phase, Phase::Thinking);
        // the physical forks stay claimed until the arena force-frees them
        assert_eq!(left.holder(), Some(0));
        assert_eq!(right.holder(), Some(0));
    }
}

//! # Arena: owns the ring, spawns workers, relays operator commands.
//!
//! The [`Arena`] is the wiring layer. It builds the fork ring and the
//! coordinator, spawns one worker task per seat, fans events out to
//! subscribers, and translates the three operator commands into core
//! transitions:
//!
//! ```text
//! Run   ──► Arena::resume() ──► Coordinator::resume()
//! Pause ──► Arena::pause()  ──► Coordinator::pause()
//! Reset ──► Arena::reset()  ──► Coordinator::reset() + force-free all forks
//! ```
//!
//! ## High-level architecture
//! ```text
//! Arena::run()
//!   ├─ fan-out listener: Bus ─► TableView::apply ─► attach snapshot
//!   │                                              └─► SubscriberSet::emit
//!   └─ JoinSet: Worker 0 .. Worker N-1   (child CancellationTokens)
//!
//! Shutdown path (OS signal or quit()):
//!   publish ShutdownRequested ─► cancel workers ─► wait up to grace
//!     ├─ all joined  ─► publish AllStoppedWithin
//!     └─ grace blown ─► publish GraceExceeded, SimError::GraceExceeded
//! ```
//!
//! ## Reset recovery
//! Workers cancelled mid-cycle never release their own forks; `reset()`
//! force-frees the whole ring instead. One race remains: a worker that passed
//! its last gate before the reset can still claim a fork *after* the sweep.
//! The fan-out listener closes it — while the observed run state is Reset,
//! any `ForkTaken` it sees is immediately force-freed again. Publish order on
//! the bus guarantees such a take always arrives after `ResetIssued`, so
//! recovery is bounded by one trip through the listener.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use symposium::{Arena, Subscribe, TableConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let subscribers: Vec<Arc<dyn Subscribe>> = Vec::new();
//!     let arena = Arc::new(Arena::new(TableConfig::default(), subscribers)?);
//!
//!     let control = Arc::clone(&arena);
//!     tokio::spawn(async move {
//!         // a control surface would call resume/pause/reset here
//!         control.resume();
//!     });
//!
//!     arena.run().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::TableConfig;
use crate::core::coordinator::{Coordinator, RunState};
use crate::core::fork::Fork;
use crate::core::shutdown;
use crate::core::view::{TableSnapshot, TableView};
use crate::core::worker::Worker;
use crate::error::SimError;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Coordinates the fork ring, seat workers, event fan-out, and shutdown.
pub struct Arena {
    cfg: TableConfig,
    coordinator: Coordinator,
    forks: Vec<Arc<Fork>>,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    view: Arc<TableView>,
    quit: CancellationToken,
}

impl Arena {
    /// Builds the ring described by `cfg` and wires the given subscribers.
    ///
    /// Seat `i` gets fork `i` on its left and fork `(i + 1) % seats` on its
    /// right — the adjacency everything else depends on.
    pub fn new(cfg: TableConfig, subscribers: Vec<Arc<dyn Subscribe>>) -> Result<Self, SimError> {
        cfg.validate()?;
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(subscribers, bus.clone()));
        let forks = (0..cfg.seats).map(|i| Arc::new(Fork::new(i))).collect();
        let view = Arc::new(TableView::new(cfg.seats));
        Ok(Self {
            cfg,
            coordinator: Coordinator::new(),
            forks,
            bus,
            subs,
            view,
            quit: CancellationToken::new(),
        })
    }

    /// Returns the configuration the arena was built with.
    pub fn config(&self) -> &TableConfig {
        &self.cfg
    }

    /// Current operator run state.
    pub fn state(&self) -> RunState {
        self.coordinator.state()
    }

    /// Current table snapshot, as observed through the event stream.
    pub fn snapshot(&self) -> TableSnapshot {
        self.view.snapshot()
    }

    /// Raw event feed (no snapshots attached). Most consumers want the
    /// [`Subscribe`] API instead.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// The Run command: start, or continue after a pause or reset.
    pub fn resume(&self) {
        self.coordinator.resume();
        self.bus
            .publish(Event::new(EventKind::Resumed).with_state(RunState::Running));
    }

    /// The Pause command. Workers park at their next suspension point; held
    /// forks survive.
    pub fn pause(&self) {
        self.coordinator.pause();
        self.bus
            .publish(Event::new(EventKind::Paused).with_state(RunState::Paused));
    }

    /// The Reset command: cancel every worker's cycle and reclaim all forks.
    ///
    /// Cancelled workers do not release forks themselves, so recovery happens
    /// here. The `ResetIssued` event goes out before the sweep; the fan-out
    /// listener uses that ordering to reclaim any fork taken behind the
    /// sweep's back.
    pub fn reset(&self) {
        self.coordinator.reset();
        self.bus
            .publish(Event::new(EventKind::ResetIssued).with_state(RunState::Reset));
        for fork in &self.forks {
            fork.force_free();
            self.bus
                .publish(Event::new(EventKind::ForkForcedFree).with_fork(fork.index()));
        }
    }

    /// The Quit command: asks `run()` to shut the table down.
    pub fn quit(&self) {
        self.quit.cancel();
    }

    /// Runs the table until an OS termination signal or [`Arena::quit`].
    ///
    /// Spawns the fan-out listener and one worker per seat, then drives
    /// shutdown: cancel workers, wait up to the configured grace, report
    /// stragglers. Call once per arena.
    pub async fn run(&self) -> Result<(), SimError> {
        self.spawn_listener();
        let runtime = self.quit.child_token();

        let mut set = JoinSet::new();
        self.spawn_workers(&mut set, &runtime);
        self.drive_shutdown(&mut set, &runtime).await
    }

    /// Subscribes to the bus, applies every event to the table view, attaches
    /// the refreshed snapshot, and fans out to subscribers.
    fn spawn_listener(&self) {
        let mut rx = self.bus.subscribe();
        let view = Arc::clone(&self.view);
        let subs = Arc::clone(&self.subs);
        let forks = self.forks.clone();
        let bus = self.bus.clone();

        tokio::spawn(async move {
            loop {
                let ev = match rx.recv().await {
                    Ok(ev) => ev,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                view.apply(&ev);

                // a fork grabbed behind the reset sweep's back is reclaimed
                // here; ResetIssued is guaranteed to precede such a take
                if ev.kind == EventKind::ForkTaken && view.run_state() == RunState::Reset {
                    if let Some(fork) = ev.fork.and_then(|i| forks.get(i)) {
                        fork.force_free();
                        bus.publish(
                            Event::new(EventKind::ForkForcedFree).with_fork(fork.index()),
                        );
                    }
                }

                let snapshot = Arc::new(view.snapshot());
                subs.emit_arc(Arc::new(ev.with_snapshot(snapshot)));
            }
        });
    }

    /// Spawns one worker per seat with ring adjacency.
    fn spawn_workers(&self, set: &mut JoinSet<()>, runtime: &CancellationToken) {
        let n = self.cfg.seats;
        for seat in 0..n {
            let worker = Worker::new(
                seat,
                Arc::clone(&self.forks[seat]),
                Arc::clone(&self.forks[(seat + 1) % n]),
                self.coordinator.gate(),
                self.bus.clone(),
                self.cfg.timing(),
            );
            set.spawn(worker.run(runtime.child_token()));
        }
    }

    /// Waits for a shutdown trigger, then cancels workers and enforces grace.
    async fn drive_shutdown(
        &self,
        set: &mut JoinSet<()>,
        runtime: &CancellationToken,
    ) -> Result<(), SimError> {
        tokio::select! {
            _ = shutdown::quit_signal() => {}
            _ = self.quit.cancelled() => {}
            _ = async { while set.join_next().await.is_some() {} } => return Ok(()),
        }
        self.bus.publish(Event::new(EventKind::ShutdownRequested));
        runtime.cancel();
        self.wait_with_grace(set).await
    }

    /// Waits for all workers to finish within the configured grace window.
    async fn wait_with_grace(&self, set: &mut JoinSet<()>) -> Result<(), SimError> {
        let done = async { while set.join_next().await.is_some() {} };
        match time::timeout(self.cfg.grace, done).await {
            Ok(()) => {
                self.bus.publish(Event::new(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                self.bus.publish(Event::new(EventKind::GraceExceeded));
                Err(SimError::GraceExceeded {
                    grace: self.cfg.grace,
                    stuck: self.view.live_seats(),
                })
            }
        }
    }
}

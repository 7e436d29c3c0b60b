//! # symposium
//!
//! **Symposium** is the concurrency core of a dining-philosophers simulation:
//! five seat workers around a ring of five forks, contending under an
//! operator-controlled run/pause/reset protocol.
//!
//! The crate deliberately contains no rendering and no control panel. It
//! exposes state snapshots to whoever draws, and three commands to whoever
//! has buttons; everything in between — the broadcast run-state coordinator,
//! the non-blocking fork-acquisition protocol, and the per-seat state
//! machine — is the point.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!          Run / Pause / Reset / Quit        (control surface)
//!                     │
//!                     ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │  Arena                                                    │
//! │  - Coordinator (watch channel: Paused / Running / Reset)  │
//! │  - Fork ring   (atomic holder slots, CAS try_acquire)     │
//! │  - Bus         (broadcast events)                         │
//! │  - TableView   (event-fed snapshot tracker)               │
//! │  - SubscriberSet (per-subscriber queues, never blocks)    │
//! └──────┬──────────────────┬──────────────────┬──────────────┘
//!        ▼                  ▼                  ▼
//!   ┌─────────┐       ┌─────────┐        ┌─────────┐
//!   │ Worker 0│       │ Worker 1│  ...   │ Worker N│     (one task per seat)
//!   └────┬────┘       └────┬────┘        └────┬────┘
//!        │ publish: PhaseChanged / ForkTaken / ForkDropped
//!        ▼
//!       Bus ──► fan-out listener ──► snapshot attached ──► subscribers
//! ```
//!
//! ### One worker cycle
//! ```text
//! loop {
//!   ├─► gate (parks while Paused/Reset; compensating delay if it parked)
//!   ├─► Thinking  (think ± 20%)
//!   ├─► gate
//!   ├─► Hungry    (fumble ± 20%)
//!   ├─► gate
//!   ├─► grab forks, once:
//!   │      left ok ─► yield ─► right ok ─► eat
//!   │      right taken ─► put left back        (back-off: no circular wait)
//!   └─► Eating    (eat ± 20%), drop left, yield, drop right
//! }
//!
//! Reset at any suspension point ─► Cancelled ─► back to Thinking;
//! the arena force-frees every fork.
//! ```
//!
//! ## Features
//! | Area            | Description                                            | Key types                    |
//! |-----------------|--------------------------------------------------------|------------------------------|
//! | **Control**     | Run/pause/reset relays with broadcast wake-up.         | [`Arena`], [`Coordinator`]   |
//! | **Resources**   | Non-blocking mutual exclusion per fork.                | [`Fork`]                     |
//! | **Snapshots**   | Per-transition table state for renderers.              | [`TableSnapshot`], [`Phase`] |
//! | **Subscribers** | Queued, panic-isolated observers; core never waits.    | [`Subscribe`]                |
//! | **Errors**      | Cooperative cancellation vs. runtime errors.           | [`Cancelled`], [`SimError`]  |
//! | **Timing**      | Jittered phase durations with a positive floor.        | [`PhaseTiming`], [`JitterPolicy`] |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use symposium::{Arena, Subscribe, TableConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = TableConfig::default();
//!     cfg.eat = Duration::from_secs(2);
//!
//!     let subscribers: Vec<Arc<dyn Subscribe>> = Vec::new();
//!     let arena = Arc::new(Arena::new(cfg, subscribers)?);
//!
//!     // the control surface drives the table from outside
//!     let control = Arc::clone(&arena);
//!     tokio::spawn(async move {
//!         control.resume();
//!         tokio::time::sleep(Duration::from_secs(30)).await;
//!         control.quit();
//!     });
//!
//!     arena.run().await?;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod policies;
mod subscribers;

// ---- Public re-exports ----

pub use config::TableConfig;
pub use core::{
    Arena, Coordinator, Fork, ForkView, Phase, RunGate, RunState, SeatColor, SeatView,
    TableSnapshot,
};
pub use error::{Cancelled, SimError};
pub use events::{Bus, Event, EventKind};
pub use policies::{JitterPolicy, PhaseTiming};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose the simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

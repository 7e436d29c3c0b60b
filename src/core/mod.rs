//! Simulation core: coordination, resources, workers, and wiring.
//!
//! Internal modules, leaves first:
//! - [`coordinator`]: process-wide run-state with broadcast wake-up;
//! - [`fork`]: binary mutual-exclusion unit with a non-blocking probe;
//! - [`worker`]: the per-seat four-phase state machine, run as an async task;
//! - [`view`]: event-fed tracker that materializes table snapshots;
//! - [`arena`]: owns the ring, spawns workers, relays operator commands,
//!   drives shutdown;
//! - [`shutdown`]: OS termination signal handling.

mod arena;
mod coordinator;
mod fork;
mod shutdown;
mod view;
mod worker;

pub use arena::Arena;
pub use coordinator::{Coordinator, RunGate, RunState};
pub use fork::Fork;
pub use view::{ForkView, SeatView, TableSnapshot};
pub use worker::{Phase, SeatColor};

//! Timing knobs for the worker cycle.
//!
//! This module groups the parameters that control **how long** each phase of
//! a seat worker's cycle lasts and **how much** those durations vary.
//!
//! ## Contents
//! - [`PhaseTiming`] — nominal durations for Thinking / Hungry / Eating
//! - [`JitterPolicy`] — bounded randomization (±fraction) applied to every
//!   delay, with a positive-duration floor
//!
//! ## Quick wiring
//! ```text
//! TableConfig::timing() ─► PhaseTiming { think, fumble, eat, jitter }
//!      └─► core::worker::Worker uses:
//!           - think/fumble/eat as the nominal per-phase delays
//!           - jitter.apply(nominal) to draw each concrete sleep
//! ```

mod jitter;
mod timing;

pub use jitter::JitterPolicy;
pub use timing::PhaseTiming;

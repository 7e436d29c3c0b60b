//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [resumed]
//! [phase] seat=2 phase=Hungry
//! [fork-taken] fork=2 seat=2
//! [fork-dropped] fork=3 seat=2
//! [reset]
//! [fork-forced-free] fork=0
//! [shutdown-requested]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Stdout event printer, enabled via the `logging` feature.
///
/// Intended for development and demos; a real renderer or structured logger
/// should implement its own [`Subscribe`].
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::Resumed => println!("[resumed]"),
            EventKind::Paused => println!("[paused]"),
            EventKind::ResetIssued => println!("[reset]"),
            EventKind::PhaseChanged => {
                if let (Some(seat), Some(phase)) = (e.seat, e.phase) {
                    println!("[phase] seat={seat} phase={phase:?}");
                }
            }
            EventKind::ForkTaken => {
                println!("[fork-taken] fork={:?} seat={:?}", e.fork, e.seat);
            }
            EventKind::ForkDropped => {
                println!("[fork-dropped] fork={:?} seat={:?}", e.fork, e.seat);
            }
            EventKind::ForkForcedFree => {
                println!("[fork-forced-free] fork={:?}", e.fork);
            }
            EventKind::SeatJoined => println!("[seat-joined] seat={:?}", e.seat),
            EventKind::SeatRetired => println!("[seat-retired] seat={:?}", e.seat),
            EventKind::ShutdownRequested => println!("[shutdown-requested]"),
            EventKind::AllStoppedWithin => println!("[all-stopped-within-grace]"),
            EventKind::GraceExceeded => println!("[grace-exceeded]"),
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked => {
                println!("[subscriber-issue] reason={:?}", e.reason);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

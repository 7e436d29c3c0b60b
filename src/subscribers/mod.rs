//! # Event subscribers: how renderers and loggers watch the table.
//!
//! The core never draws and never waits for anyone who does. External
//! collaborators implement [`Subscribe`] and receive every table transition,
//! each carrying the post-transition [`TableSnapshot`](crate::TableSnapshot).
//!
//! ```text
//! Bus ──► arena fan-out listener ──► SubscriberSet
//!                                      ├──► [queue] ──► worker ──► renderer.on_event()
//!                                      ├──► [queue] ──► worker ──► logger.on_event()
//!                                      └──► [queue] ──► worker ──► ...
//! ```
//!
//! Delivery is queued per subscriber and strictly non-blocking for the core:
//! a slow renderer drops events (reported as `SubscriberOverflow`) rather
//! than stalling a seat worker.

mod set;
mod subscriber;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscriber::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;

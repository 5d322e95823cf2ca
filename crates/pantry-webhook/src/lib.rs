//! Outbound webhook delivery.
//!
//! A [`Dispatcher`] looks up the active subscribers of an event and POSTs one
//! JSON [`Envelope`] to each of them concurrently. Delivery is fire-and-forget:
//! callers get a task handle they are free to drop, and failures only show up
//! in the logs.

mod dispatcher;
mod envelope;

pub use dispatcher::{CycleReport, DEFAULT_TIMEOUT, Dispatcher};
pub use envelope::Envelope;

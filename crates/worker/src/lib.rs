//! Logsift worker layer.
//!
//! Consumes pushed channel deliveries and converts the channel's
//! at-least-once guarantee into an exactly-once stored effect. The
//! [`Dispatcher`] drives the per-message pipeline (decode → idempotency
//! guard → simulated processing → redaction → atomic commit); the
//! [`simulate`] module holds the bounded stand-in for real per-record work.

mod dispatcher;
pub mod simulate;

pub use crate::dispatcher::{
    Completion, DispatchError, DispatchOutcome, Dispatcher, RecordState,
};
pub use crate::simulate::{simulate_processing, ProcessingProgress, SimulatorConfig};

//! Logsift channel layer.
//!
//! The message channel itself is an external collaborator; this crate holds
//! the narrow contract the pipeline consumes it through ([`LogPublisher`]),
//! the push-envelope codec the worker decodes deliveries with, and an
//! in-memory implementation for tests and single-process runs.
//!
//! The channel guarantees at-least-once delivery: a published message may be
//! pushed more than once but is never silently dropped. The worker side
//! compensates (see the worker crate) rather than assuming better semantics
//! here.

use async_trait::async_trait;
use ingest::NormalizedMessage;
use thiserror::Error;

mod envelope;
mod memory;

pub use crate::envelope::{EnvelopeError, PushEnvelope, PushMessage};
pub use crate::memory::MemoryChannel;

/// Publish-side failures. Always transient from the pipeline's perspective:
/// the ingestion caller sees a server error and may retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChannelError {
    #[error("failed to encode channel payload: {0}")]
    Encode(String),

    #[error("channel rejected publish: {0}")]
    PublishFailed(String),
}

/// Contract for handing a normalized message to the channel.
///
/// `publish` resolves only after the channel has accepted the message, so a
/// successful return is the durability point the ingestion 202 relies on.
/// The returned string is the channel-assigned delivery id.
#[async_trait]
pub trait LogPublisher: Send + Sync {
    async fn publish(&self, message: &NormalizedMessage) -> Result<String, ChannelError>;
}

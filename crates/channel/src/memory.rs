//! In-memory channel used by tests and the all-in-one binary.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use ingest::NormalizedMessage;
use tokio::sync::mpsc;
use tracing::debug;

use crate::envelope::PushEnvelope;
use crate::{ChannelError, LogPublisher};

/// In-process stand-in for the external message channel.
///
/// Published messages are wrapped into [`PushEnvelope`]s, assigned a
/// sequential delivery id, and forwarded on an unbounded mpsc for a delivery
/// pump to push at the worker. Redelivery policy lives with the consumer of
/// the receiver, exactly as it lives with the real channel.
#[derive(Debug)]
pub struct MemoryChannel {
    deliveries: mpsc::UnboundedSender<PushEnvelope>,
    sequence: AtomicU64,
}

impl MemoryChannel {
    /// Create a channel and the receiving end its deliveries arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PushEnvelope>) {
        let (deliveries, rx) = mpsc::unbounded_channel();
        (
            Self {
                deliveries,
                sequence: AtomicU64::new(0),
            },
            rx,
        )
    }

    fn next_message_id(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("local-{seq}")
    }
}

#[async_trait]
impl LogPublisher for MemoryChannel {
    async fn publish(&self, message: &NormalizedMessage) -> Result<String, ChannelError> {
        let message_id = self.next_message_id();
        let envelope = PushEnvelope::wrap(message, message_id.clone())
            .map_err(|err| ChannelError::Encode(err.to_string()))?;

        self.deliveries
            .send(envelope)
            .map_err(|_| ChannelError::PublishFailed("channel receiver dropped".to_string()))?;

        debug!(
            message_id = %message_id,
            tenant_id = %message.tenant_id,
            log_id = %message.log_id,
            "message_published"
        );
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ingest::MessageSource;

    fn message(log_id: &str) -> NormalizedMessage {
        NormalizedMessage {
            tenant_id: "acme".into(),
            log_id: log_id.into(),
            text: "hello".into(),
            source: MessageSource::JsonUpload,
            received_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn publish_delivers_an_envelope() {
        let (channel, mut rx) = MemoryChannel::new();

        let id = channel.publish(&message("log-1")).await.unwrap();
        let envelope = rx.recv().await.unwrap();

        assert_eq!(envelope.message_id(), id);
        assert_eq!(envelope.decode().unwrap().log_id, "log-1");
    }

    #[tokio::test]
    async fn delivery_ids_are_distinct_and_ordered() {
        let (channel, _rx) = MemoryChannel::new();

        let a = channel.publish(&message("log-1")).await.unwrap();
        let b = channel.publish(&message("log-2")).await.unwrap();

        assert_eq!(a, "local-1");
        assert_eq!(b, "local-2");
    }

    #[tokio::test]
    async fn publish_after_receiver_dropped_fails() {
        let (channel, rx) = MemoryChannel::new();
        drop(rx);

        let err = channel.publish(&message("log-1")).await.unwrap_err();
        assert!(matches!(err, ChannelError::PublishFailed(_)));
    }
}

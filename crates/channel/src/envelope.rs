//! Push envelope codec.
//!
//! The channel delivers messages by POSTing a JSON wrapper whose `data`
//! field is the base64-encoded JSON serialization of a
//! [`NormalizedMessage`]. Routing attributes ride alongside for filtering
//! and metrics; the decoded payload's own `tenant_id` is authoritative.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ingest::NormalizedMessage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decode failures. Both are terminal: reprocessing an undecodable envelope
/// can never succeed, so the worker rejects without requesting redelivery.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EnvelopeError {
    #[error("payload is not valid base64: {0}")]
    InvalidBase64(String),

    #[error("payload does not decode to a message: {0}")]
    InvalidPayload(String),
}

/// The wrapper a push delivery arrives in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushEnvelope {
    pub message: PushMessage,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<String>,
}

/// The channel-level message inside a push envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    /// Base64-encoded JSON `NormalizedMessage`.
    pub data: String,

    /// Channel-assigned delivery id.
    pub message_id: String,

    /// Routing attributes (`tenant_id`, `source`). Advisory only.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, String>,
}

impl PushEnvelope {
    /// Encode a message into the wrapper a push subscriber would receive.
    pub fn wrap(
        message: &NormalizedMessage,
        message_id: impl Into<String>,
    ) -> Result<Self, serde_json::Error> {
        let payload = serde_json::to_vec(message)?;
        let mut attributes = HashMap::new();
        attributes.insert("tenant_id".to_string(), message.tenant_id.clone());
        attributes.insert("source".to_string(), message.source.to_string());

        Ok(Self {
            message: PushMessage {
                data: BASE64.encode(payload),
                message_id: message_id.into(),
                attributes,
            },
            subscription: None,
        })
    }

    /// Decode the payload back into a [`NormalizedMessage`].
    pub fn decode(&self) -> Result<NormalizedMessage, EnvelopeError> {
        let bytes = BASE64
            .decode(&self.message.data)
            .map_err(|err| EnvelopeError::InvalidBase64(err.to_string()))?;
        serde_json::from_slice(&bytes)
            .map_err(|err| EnvelopeError::InvalidPayload(err.to_string()))
    }

    pub fn message_id(&self) -> &str {
        &self.message.message_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ingest::MessageSource;

    fn message() -> NormalizedMessage {
        NormalizedMessage {
            tenant_id: "acme".into(),
            log_id: "log-1".into(),
            text: "hello".into(),
            source: MessageSource::JsonUpload,
            received_at: Utc::now(),
        }
    }

    #[test]
    fn wrap_then_decode() {
        let original = message();
        let envelope = PushEnvelope::wrap(&original, "m-1").unwrap();

        assert_eq!(envelope.message_id(), "m-1");
        assert_eq!(
            envelope.message.attributes.get("tenant_id").map(String::as_str),
            Some("acme")
        );
        assert_eq!(
            envelope.message.attributes.get("source").map(String::as_str),
            Some("json_upload")
        );
        assert_eq!(envelope.decode().unwrap(), original);
    }

    #[test]
    fn bad_base64_is_terminal() {
        let mut envelope = PushEnvelope::wrap(&message(), "m-1").unwrap();
        envelope.message.data = "!!!not-base64!!!".into();

        assert!(matches!(
            envelope.decode().unwrap_err(),
            EnvelopeError::InvalidBase64(_)
        ));
    }

    #[test]
    fn valid_base64_of_garbage_is_terminal() {
        let mut envelope = PushEnvelope::wrap(&message(), "m-1").unwrap();
        envelope.message.data = BASE64.encode(b"{\"not\": \"a message\"}");

        assert!(matches!(
            envelope.decode().unwrap_err(),
            EnvelopeError::InvalidPayload(_)
        ));
    }

    #[test]
    fn push_body_uses_camel_case_message_id() {
        let envelope = PushEnvelope::wrap(&message(), "m-1").unwrap();
        let body = serde_json::to_value(&envelope).unwrap();
        assert!(body["message"]["messageId"].is_string());
    }
}

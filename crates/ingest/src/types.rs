//! Canonical message types produced by normalization.
//!
//! [`NormalizedMessage`] is the one shape every downstream stage consumes.
//! It is validated exactly once, here at the ingestion boundary; the worker
//! trusts the decoded payload without re-checking field shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which ingestion path produced a message.
///
/// Serialized as `json_upload` / `text_upload`, both on the channel payload
/// and in the persisted record's `source` field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageSource {
    JsonUpload,
    TextUpload,
}

impl MessageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageSource::JsonUpload => "json_upload",
            MessageSource::TextUpload => "text_upload",
        }
    }
}

impl fmt::Display for MessageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The canonical record flowing through the pipeline.
///
/// `(tenant_id, log_id)` is the unique logical identity of a record across
/// the whole pipeline; every downstream structure keys on this pair.
/// `tenant_id` is always lowercased and trimmed before the message is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedMessage {
    /// Lowercased, trimmed tenant identifier.
    pub tenant_id: String,

    /// Caller-supplied (JSON path) or generated (text path) record id.
    pub log_id: String,

    /// The literal log text, unmodified.
    pub text: String,

    /// Which ingestion path produced this message.
    pub source: MessageSource,

    /// When the ingestion boundary accepted the record.
    pub received_at: DateTime<Utc>,
}

//! Persisted record shapes and the composite key they live under.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite key identifying one logical record.
///
/// The path layout `tenants/{tenant_id}/processed_logs/{log_id}` is the
/// structural tenant partition: no entity ever references across partitions,
/// and nothing outside a tenant's prefix can collide with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub tenant_id: String,
    pub log_id: String,
}

impl RecordKey {
    pub fn new(tenant_id: impl Into<String>, log_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            log_id: log_id.into(),
        }
    }

    /// Store path of the processed record.
    pub fn record_path(&self) -> String {
        format!(
            "tenants/{}/processed_logs/{}",
            self.tenant_id, self.log_id
        )
    }

    /// Store path of the owning tenant's metadata document.
    pub fn tenant_path(&self) -> String {
        format!("tenants/{}", self.tenant_id)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tenant_id, self.log_id)
    }
}

/// Terminal status of a processed record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Processed,
}

/// The durable result of processing one record.
///
/// At most one exists per [`RecordKey`]; once created it is immutable. Both
/// the original and the redacted text are retained, matching the source
/// system's behavior (see DESIGN.md).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessedRecord {
    /// Ingestion path that produced the record (`json_upload`/`text_upload`).
    pub source: String,

    /// The log text exactly as ingested.
    pub original_text: String,

    /// The redacted text.
    pub modified_data: String,

    /// Character length of the original text.
    pub text_length: u64,

    /// Simulated processing cost in milliseconds.
    pub processing_time_ms: u64,

    /// When the ingestion boundary accepted the record.
    pub received_at: DateTime<Utc>,

    /// When the worker committed the record.
    pub processed_at: DateTime<Utc>,

    pub status: RecordStatus,
}

/// Per-tenant bookkeeping document, merged on every successful commit.
///
/// Best-effort only: a failed merge is logged and never blocks
/// acknowledgment, and nothing reads it for correctness decisions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TenantMetadata {
    pub tenant_id: String,
    pub last_updated: DateTime<Utc>,
}

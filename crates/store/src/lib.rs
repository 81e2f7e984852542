//! Logsift store layer.
//!
//! Defines the narrow contract the pipeline requires from the external
//! document store, the persisted record shapes, and an in-memory
//! implementation for tests and single-process runs.
//!
//! The contract is deliberately small, three capabilities only:
//!
//! 1. point lookup by composite key, returning presence/absence;
//! 2. an atomic create-only write that fails distinctly (never silently)
//!    when the key already exists;
//! 3. an independently-failing merge write for auxiliary tenant metadata.
//!
//! There is intentionally no plain overwrite for processed records: under
//! redelivery races an overwrite would silently defeat the exactly-once
//! invariant the create-only write enforces.

use async_trait::async_trait;

mod error;
mod memory;
mod types;

pub use crate::error::StoreError;
pub use crate::memory::MemoryStore;
pub use crate::types::{ProcessedRecord, RecordKey, RecordStatus, TenantMetadata};

/// Capability contract required from the durable store.
///
/// Implementations are shared across many concurrent handlers behind an
/// `Arc`; they carry no per-record affinity.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point lookup of a processed record.
    async fn get_processed(
        &self,
        key: &RecordKey,
    ) -> Result<Option<ProcessedRecord>, StoreError>;

    /// Atomic create-if-absent. Fails with [`StoreError::AlreadyExists`]
    /// when the key is occupied; never overwrites.
    async fn create_processed(
        &self,
        key: &RecordKey,
        record: &ProcessedRecord,
    ) -> Result<(), StoreError>;

    /// Upsert of the per-tenant metadata document. Independent of record
    /// writes and allowed to fail without affecting them.
    async fn merge_tenant_metadata(
        &self,
        tenant_id: &str,
        metadata: &TenantMetadata,
    ) -> Result<(), StoreError>;
}

//! In-memory store used by tests and the all-in-one binary.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::error::StoreError;
use crate::types::{ProcessedRecord, RecordKey, TenantMetadata};
use crate::DocumentStore;

/// `DashMap`-backed [`DocumentStore`].
///
/// Create-if-absent goes through the map's entry API, so concurrent creates
/// of the same key serialize on the shard lock and exactly one wins, the
/// same guarantee the production document store provides.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<String, ProcessedRecord>,
    tenants: DashMap<String, TenantMetadata>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of processed records across all tenants.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Snapshot of one record, if present. Test/introspection helper.
    pub fn record(&self, key: &RecordKey) -> Option<ProcessedRecord> {
        self.records.get(&key.record_path()).map(|r| r.clone())
    }

    /// Snapshot of one tenant's metadata, if present.
    pub fn tenant_metadata(&self, tenant_id: &str) -> Option<TenantMetadata> {
        self.tenants
            .get(&format!("tenants/{tenant_id}"))
            .map(|m| m.clone())
    }

    /// Record paths under one tenant's partition, for isolation checks.
    pub fn paths_for_tenant(&self, tenant_id: &str) -> Vec<String> {
        let prefix = format!("tenants/{tenant_id}/processed_logs/");
        self.records
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|path| path.starts_with(&prefix))
            .collect()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_processed(
        &self,
        key: &RecordKey,
    ) -> Result<Option<ProcessedRecord>, StoreError> {
        Ok(self.records.get(&key.record_path()).map(|r| r.clone()))
    }

    async fn create_processed(
        &self,
        key: &RecordKey,
        record: &ProcessedRecord,
    ) -> Result<(), StoreError> {
        let path = key.record_path();
        match self.records.entry(path.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists { path }),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                debug!(path = %path, "record_created");
                Ok(())
            }
        }
    }

    async fn merge_tenant_metadata(
        &self,
        tenant_id: &str,
        metadata: &TenantMetadata,
    ) -> Result<(), StoreError> {
        self.tenants
            .insert(format!("tenants/{tenant_id}"), metadata.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordStatus;
    use chrono::Utc;
    use std::sync::Arc;

    fn record(text: &str) -> ProcessedRecord {
        ProcessedRecord {
            source: "json_upload".into(),
            original_text: text.into(),
            modified_data: text.into(),
            text_length: text.chars().count() as u64,
            processing_time_ms: 0,
            received_at: Utc::now(),
            processed_at: Utc::now(),
            status: RecordStatus::Processed,
        }
    }

    #[tokio::test]
    async fn create_then_get() {
        let store = MemoryStore::new();
        let key = RecordKey::new("acme", "log-1");

        assert_eq!(store.get_processed(&key).await.unwrap(), None);
        store.create_processed(&key, &record("hello")).await.unwrap();

        let fetched = store.get_processed(&key).await.unwrap().unwrap();
        assert_eq!(fetched.original_text, "hello");
        assert_eq!(store.record_count(), 1);
    }

    #[tokio::test]
    async fn second_create_conflicts_and_preserves_first() {
        let store = MemoryStore::new();
        let key = RecordKey::new("acme", "log-1");

        store.create_processed(&key, &record("first")).await.unwrap();
        let err = store
            .create_processed(&key, &record("second"))
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        let kept = store.get_processed(&key).await.unwrap().unwrap();
        assert_eq!(kept.original_text, "first");
        assert_eq!(store.record_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_creates_admit_exactly_one() {
        let store = Arc::new(MemoryStore::new());
        let key = RecordKey::new("acme", "log-1");

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                store.create_processed(&key, &record(&format!("w{i}"))).await
            }));
        }

        let mut wins = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => wins += 1,
                Err(err) => assert!(err.is_conflict()),
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(store.record_count(), 1);
    }

    #[tokio::test]
    async fn same_log_id_lands_in_distinct_tenant_partitions() {
        let store = MemoryStore::new();
        let a = RecordKey::new("acme", "log-1");
        let b = RecordKey::new("beta_inc", "log-1");

        store.create_processed(&a, &record("a")).await.unwrap();
        store.create_processed(&b, &record("b")).await.unwrap();

        assert_eq!(store.record_count(), 2);
        assert_eq!(store.paths_for_tenant("acme").len(), 1);
        assert_eq!(store.paths_for_tenant("beta_inc").len(), 1);
        assert_eq!(
            store.paths_for_tenant("acme"),
            vec!["tenants/acme/processed_logs/log-1".to_string()]
        );
    }

    #[tokio::test]
    async fn metadata_merge_upserts() {
        let store = MemoryStore::new();
        let first = TenantMetadata {
            tenant_id: "acme".into(),
            last_updated: Utc::now(),
        };
        store.merge_tenant_metadata("acme", &first).await.unwrap();

        let later = TenantMetadata {
            tenant_id: "acme".into(),
            last_updated: Utc::now(),
        };
        store.merge_tenant_metadata("acme", &later).await.unwrap();

        let stored = store.tenant_metadata("acme").unwrap();
        assert_eq!(stored.last_updated, later.last_updated);
    }
}

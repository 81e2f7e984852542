//! Per-delivery pipeline: decode → guard → simulate → redact → commit.
//!
//! The channel guarantees at-least-once delivery; the dispatcher's job is to
//! turn that into an exactly-once stored effect. Two layers do the work:
//!
//! 1. a cheap pre-check lookup that skips all processing for known
//!    duplicates, and
//! 2. the store's atomic create-if-absent write, which is the authoritative
//!    gate. The pre-check has a race window under concurrent redelivery;
//!    the create does not.
//!
//! Duplicates (either layer) are a successful terminal outcome, acknowledged
//! exactly like a fresh commit. Only transient store faults propagate, which
//! leaves the delivery unacknowledged so the channel redelivers it.

use std::fmt;
use std::sync::Arc;

use channel::{EnvelopeError, PushEnvelope};
use chrono::Utc;
use ingest::NormalizedMessage;
use metrics::counter;
use store::{DocumentStore, ProcessedRecord, RecordKey, RecordStatus, StoreError, TenantMetadata};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::simulate::{simulate_processing, SimulatorConfig};

/// Lifecycle of one delivery inside the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    Received,
    Checked,
    Processing,
    Committing,
    Acknowledged,
    Duplicate,
    Failed,
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordState::Received => "received",
            RecordState::Checked => "checked",
            RecordState::Processing => "processing",
            RecordState::Committing => "committing",
            RecordState::Acknowledged => "acknowledged",
            RecordState::Duplicate => "duplicate",
            RecordState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Successful terminal outcomes. A duplicate is not an error: the logical
/// effect (exactly one stored record) already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// This delivery's commit created the record.
    Committed,
    /// The record already existed (pre-check hit or commit-time conflict).
    Duplicate,
}

/// Outcome plus the identity it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub key: RecordKey,
    pub outcome: DispatchOutcome,
}

/// Failures that escape the dispatcher.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Undecodable envelope. Terminal: redelivery can never succeed.
    #[error("malformed channel envelope: {0}")]
    MalformedEnvelope(#[from] EnvelopeError),

    /// Transient store fault. The delivery stays unacknowledged so the
    /// channel's retry policy redelivers it.
    #[error("store failure while processing record: {0}")]
    Store(#[from] StoreError),
}

impl DispatchError {
    /// Whether withholding acknowledgment (and letting the channel
    /// redeliver) can make progress.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DispatchError::Store(err) if !err.is_conflict())
    }
}

/// Drives the per-message pipeline against an injected store.
///
/// No in-process locking: all cross-delivery races for the same key resolve
/// at the store's atomic create.
pub struct Dispatcher {
    store: Arc<dyn DocumentStore>,
    simulator: SimulatorConfig,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn DocumentStore>, simulator: SimulatorConfig) -> Self {
        Self { store, simulator }
    }

    /// Handle one pushed envelope end to end.
    pub async fn dispatch(&self, envelope: &PushEnvelope) -> Result<Completion, DispatchError> {
        let message = match envelope.decode() {
            Ok(message) => message,
            Err(err) => {
                counter!("worker_malformed_envelopes_total").increment(1);
                warn!(
                    message_id = %envelope.message_id(),
                    error = %err,
                    "rejecting undecodable envelope"
                );
                return Err(err.into());
            }
        };
        self.process(message).await
    }

    /// Handle one decoded message: guard → simulate → redact → commit.
    pub async fn process(&self, message: NormalizedMessage) -> Result<Completion, DispatchError> {
        let key = RecordKey::new(&message.tenant_id, &message.log_id);
        let mut state = RecordState::Received;

        // Pre-check: an optimization only. Skips the simulated work for
        // known duplicates but cannot rule out a concurrent racer.
        let existing = match self.store.get_processed(&key).await {
            Ok(existing) => existing,
            Err(err) => {
                self.advance(&key, &mut state, RecordState::Failed);
                counter!("worker_failures_total").increment(1);
                return Err(err.into());
            }
        };
        self.advance(&key, &mut state, RecordState::Checked);

        if existing.is_some() {
            self.advance(&key, &mut state, RecordState::Duplicate);
            counter!("worker_duplicates_total", "layer" => "precheck").increment(1);
            info!(
                tenant_id = %key.tenant_id,
                log_id = %key.log_id,
                "duplicate delivery detected before processing"
            );
            return Ok(Completion {
                key,
                outcome: DispatchOutcome::Duplicate,
            });
        }

        self.advance(&key, &mut state, RecordState::Processing);
        let text_length = message.text.chars().count();
        let processing_time_ms =
            simulate_processing(text_length, &self.simulator, |_| {}).await;

        let redaction = redact::redact(&message.text);
        let redaction_matches = redaction.total_matches();
        let record = ProcessedRecord {
            source: message.source.to_string(),
            original_text: message.text,
            modified_data: redaction.text,
            text_length: text_length as u64,
            processing_time_ms,
            received_at: message.received_at,
            processed_at: Utc::now(),
            status: RecordStatus::Processed,
        };

        self.advance(&key, &mut state, RecordState::Committing);
        match self.store.create_processed(&key, &record).await {
            Ok(()) => {
                self.merge_metadata(&key).await;
                self.advance(&key, &mut state, RecordState::Acknowledged);
                counter!("worker_committed_total").increment(1);
                info!(
                    tenant_id = %key.tenant_id,
                    log_id = %key.log_id,
                    processing_time_ms,
                    redactions = redaction_matches,
                    "record committed"
                );
                Ok(Completion {
                    key,
                    outcome: DispatchOutcome::Committed,
                })
            }
            Err(err) if err.is_conflict() => {
                // A concurrent delivery won the race after our pre-check.
                // The logical effect already holds, so this is a success.
                self.advance(&key, &mut state, RecordState::Duplicate);
                counter!("worker_duplicates_total", "layer" => "commit").increment(1);
                info!(
                    tenant_id = %key.tenant_id,
                    log_id = %key.log_id,
                    "concurrent delivery already committed this record"
                );
                Ok(Completion {
                    key,
                    outcome: DispatchOutcome::Duplicate,
                })
            }
            Err(err) => {
                self.advance(&key, &mut state, RecordState::Failed);
                counter!("worker_failures_total").increment(1);
                warn!(
                    tenant_id = %key.tenant_id,
                    log_id = %key.log_id,
                    error = %err,
                    "commit failed; leaving delivery unacknowledged"
                );
                Err(err.into())
            }
        }
    }

    /// Best-effort tenant bookkeeping. Never blocks acknowledgment.
    async fn merge_metadata(&self, key: &RecordKey) {
        let metadata = TenantMetadata {
            tenant_id: key.tenant_id.clone(),
            last_updated: Utc::now(),
        };
        if let Err(err) = self
            .store
            .merge_tenant_metadata(&key.tenant_id, &metadata)
            .await
        {
            warn!(
                tenant_id = %key.tenant_id,
                error = %err,
                "tenant metadata merge failed"
            );
        }
    }

    fn advance(&self, key: &RecordKey, state: &mut RecordState, next: RecordState) {
        debug!(
            tenant_id = %key.tenant_id,
            log_id = %key.log_id,
            from = %state,
            to = %next,
            "record_state"
        );
        *state = next;
    }
}

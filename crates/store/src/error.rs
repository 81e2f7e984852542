//! Error surface of the store contract.

use thiserror::Error;

/// Failures a [`DocumentStore`](crate::DocumentStore) operation can produce.
///
/// `AlreadyExists` is the one expected failure: it is how the atomic
/// create-only write reports that another delivery already committed the
/// record. Everything else is a transient infrastructure fault that leaves
/// the delivery unacknowledged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    /// The create-only write found the key occupied.
    #[error("record already exists at `{path}`")]
    AlreadyExists { path: String },

    /// The backing store rejected or failed the operation.
    #[error("store backend failure: {0}")]
    Backend(String),

    /// The backing store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// True for the expected create-conflict; false for transient faults.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }
}

//! Error surface for the normalization boundary.
//!
//! All variants are validation failures: the request never reaches the
//! channel, and the caller sees a 400. Variants are cloneable and comparable
//! so handlers and tests can match on the exact failure.

use thiserror::Error;

/// Errors produced while validating and normalizing an inbound payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NormalizeError {
    /// JSON body failed to parse as an object.
    #[error("body is not valid JSON: {0}")]
    InvalidJson(String),

    /// A required JSON field is absent.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A required JSON field is present but empty after trimming.
    #[error("field `{0}` must be a non-empty string")]
    EmptyField(&'static str),

    /// The text variant arrived without its mandatory tenant header.
    #[error("missing tenant header `{0}`")]
    MissingTenantHeader(String),

    /// Raw text body is not valid UTF-8.
    #[error("body is not valid utf-8: {0}")]
    InvalidUtf8(String),

    /// Text is empty (or whitespace-only) after the emptiness check.
    #[error("log text must not be empty")]
    EmptyText,

    /// Body exceeds the configured size cap.
    #[error("payload of {got} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { got: usize, limit: usize },
}

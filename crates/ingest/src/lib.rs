//! Logsift normalization layer.
//!
//! This is where records enter the pipeline. Heterogeneous input, a JSON
//! document or a raw text body, is validated once and canonicalized into a
//! [`NormalizedMessage`] that every downstream stage can trust.
//!
//! ## What we do here
//!
//! - **Validate** - JSON bodies must carry non-empty `tenant_id` and `text`;
//!   raw-text bodies must arrive with the tenant header.
//! - **Canonicalize tenants** - tenant ids are trimmed and lowercased so the
//!   store partitions stay stable regardless of caller casing.
//! - **Generate ids** - `log_id` defaults to a fresh UUIDv4 token when the
//!   caller doesn't supply one (the text path never accepts one).
//! - **Enforce limits** - oversized bodies are rejected before any work.
//!
//! This module is the sole input-validation boundary; no other component
//! re-validates message shape.

use std::time::Instant;

use serde::Deserialize;
use tracing::{info, warn};

mod config;
mod error;
mod types;

pub use crate::config::IngestConfig;
pub use crate::error::NormalizeError;
pub use crate::types::{MessageSource, NormalizedMessage};

use chrono::Utc;

/// Normalize an inbound request into the canonical message shape.
///
/// Dispatches on content type: `application/json` takes the JSON variant,
/// everything else is treated as a literal text body (which makes the tenant
/// header mandatory).
pub fn normalize(
    content_type: Option<&str>,
    tenant_header: Option<&str>,
    body: &[u8],
    cfg: &IngestConfig,
) -> Result<NormalizedMessage, NormalizeError> {
    let start = Instant::now();

    let result = if is_json(content_type) {
        normalize_json(body, cfg)
    } else {
        normalize_text(tenant_header, body, cfg)
    };

    let elapsed_micros = start.elapsed().as_micros();
    match &result {
        Ok(message) => info!(
            tenant_id = %message.tenant_id,
            log_id = %message.log_id,
            source = %message.source,
            text_len = message.text.len(),
            elapsed_micros,
            "normalize_success"
        ),
        Err(err) => warn!(error = %err, elapsed_micros, "normalize_failure"),
    }

    result
}

/// JSON variant: body must be an object with non-empty string `tenant_id`
/// and `text`; `log_id` defaults to a generated token.
pub fn normalize_json(
    body: &[u8],
    cfg: &IngestConfig,
) -> Result<NormalizedMessage, NormalizeError> {
    check_size(body, cfg)?;

    #[derive(Deserialize)]
    struct JsonBody {
        tenant_id: Option<String>,
        log_id: Option<String>,
        text: Option<String>,
    }

    let parsed: JsonBody =
        serde_json::from_slice(body).map_err(|err| NormalizeError::InvalidJson(err.to_string()))?;

    let tenant_id = required_field("tenant_id", parsed.tenant_id)?;
    let text = match parsed.text {
        None => return Err(NormalizeError::MissingField("text")),
        Some(text) if text.trim().is_empty() => return Err(NormalizeError::EmptyField("text")),
        Some(text) => text,
    };

    let log_id = match parsed.log_id {
        Some(id) if !id.trim().is_empty() => id.trim().to_string(),
        _ => generate_log_id(),
    };

    Ok(NormalizedMessage {
        tenant_id: canonical_tenant(&tenant_id),
        log_id,
        text,
        source: MessageSource::JsonUpload,
        received_at: Utc::now(),
    })
}

/// Text variant: the body is the literal text, the tenant header is
/// mandatory, and `log_id` is always generated.
pub fn normalize_text(
    tenant_header: Option<&str>,
    body: &[u8],
    cfg: &IngestConfig,
) -> Result<NormalizedMessage, NormalizeError> {
    check_size(body, cfg)?;

    let tenant_id = match tenant_header {
        Some(value) if !value.trim().is_empty() => value,
        _ => return Err(NormalizeError::MissingTenantHeader(cfg.tenant_header.clone())),
    };

    let text = std::str::from_utf8(body)
        .map_err(|err| NormalizeError::InvalidUtf8(err.to_string()))?
        .to_string();
    if text.trim().is_empty() {
        return Err(NormalizeError::EmptyText);
    }

    Ok(NormalizedMessage {
        tenant_id: canonical_tenant(tenant_id),
        log_id: generate_log_id(),
        text,
        source: MessageSource::TextUpload,
        received_at: Utc::now(),
    })
}

/// Trim and lowercase a tenant id so store partitions stay stable.
pub fn canonical_tenant(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn generate_log_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.to_ascii_lowercase().starts_with("application/json"))
        .unwrap_or(false)
}

fn check_size(body: &[u8], cfg: &IngestConfig) -> Result<(), NormalizeError> {
    if body.len() > cfg.max_payload_bytes {
        return Err(NormalizeError::PayloadTooLarge {
            got: body.len(),
            limit: cfg.max_payload_bytes,
        });
    }
    Ok(())
}

fn required_field(
    name: &'static str,
    value: Option<String>,
) -> Result<String, NormalizeError> {
    match value {
        None => Err(NormalizeError::MissingField(name)),
        Some(value) if value.trim().is_empty() => Err(NormalizeError::EmptyField(name)),
        Some(value) => Ok(value),
    }
}

//! Runtime configuration for the normalization boundary.

use serde::{Deserialize, Serialize};

/// Policy knobs for inbound payload handling.
///
/// Cheap to clone; deserializable from the service's configuration sources
/// with per-field defaults so a partial config file stays valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Header carrying the tenant id on the raw-text path. Matched
    /// case-insensitively by the HTTP layer.
    #[serde(default = "default_tenant_header")]
    pub tenant_header: String,

    /// Maximum accepted body size in bytes.
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            tenant_header: default_tenant_header(),
            max_payload_bytes: default_max_payload_bytes(),
        }
    }
}

fn default_tenant_header() -> String {
    "x-tenant-id".to_string()
}

fn default_max_payload_bytes() -> usize {
    1024 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = IngestConfig::default();
        assert_eq!(cfg.tenant_header, "x-tenant-id");
        assert_eq!(cfg.max_payload_bytes, 1024 * 1024);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: IngestConfig = serde_json::from_str(r#"{"tenant_header": "x-org"}"#).unwrap();
        assert_eq!(cfg.tenant_header, "x-org");
        assert_eq!(cfg.max_payload_bytes, 1024 * 1024);
    }
}

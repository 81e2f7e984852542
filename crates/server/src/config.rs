use std::net::SocketAddr;
use std::time::Duration;

use ingest::IngestConfig;
use serde::{Deserialize, Serialize};
use worker::SimulatorConfig;

/// Service configuration for both HTTP apps and the local delivery pump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Bind address shared by both listeners.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Port of the ingestion app (`POST /ingest`).
    #[serde(default = "default_ingest_port")]
    pub ingest_port: u16,

    /// Port of the worker app (`POST /process`).
    #[serde(default = "default_worker_port")]
    pub worker_port: u16,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// `tracing` env-filter directive.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Normalization policy.
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Simulated-processing cost model.
    #[serde(default)]
    pub simulator: SimulatorConfig,

    /// Redelivery attempts the local pump makes before dead-lettering.
    #[serde(default = "default_delivery_attempts")]
    pub delivery_attempts: u32,

    /// Delay between local redelivery attempts, in milliseconds.
    #[serde(default = "default_redelivery_delay_ms")]
    pub redelivery_delay_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            ingest_port: default_ingest_port(),
            worker_port: default_worker_port(),
            timeout_secs: default_timeout_secs(),
            max_body_bytes: default_max_body_bytes(),
            log_level: default_log_level(),
            ingest: IngestConfig::default(),
            simulator: SimulatorConfig::default(),
            delivery_attempts: default_delivery_attempts(),
            redelivery_delay_ms: default_redelivery_delay_ms(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from an optional `logsift` config file with
    /// `LOGSIFT__`-prefixed environment variable overrides.
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("logsift").required(false))
            .add_source(config::Environment::with_prefix("LOGSIFT").separator("__"));

        Ok(builder.build()?.try_deserialize()?)
    }

    pub fn ingest_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.bind_addr, self.ingest_port).parse()?)
    }

    pub fn worker_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.bind_addr, self.worker_port).parse()?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn redelivery_delay(&self) -> Duration {
        Duration::from_millis(self.redelivery_delay_ms)
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_ingest_port() -> u16 {
    8080
}

fn default_worker_port() -> u16 {
    8081
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_delivery_attempts() -> u32 {
    5
}

fn default_redelivery_delay_ms() -> u64 {
    200
}

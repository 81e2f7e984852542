//! Logsift HTTP surface.
//!
//! Two small axum apps over the pipeline crates:
//!
//! - **Ingestion**: `POST /ingest` accepts a JSON or raw-text log record,
//!   normalizes it, publishes it to the channel, and returns 202 once the
//!   channel has accepted it. `GET /` is the liveness probe, `GET /metrics`
//!   the Prometheus exposition.
//! - **Worker**: `POST /process` receives pushed channel envelopes and
//!   drives them through the idempotent processing pipeline. 202/409
//!   acknowledge, 400 rejects without redelivery, 500 requests redelivery.
//!
//! The `logsift` binary runs both apps in one process wired through the
//! in-memory channel and store; production deployments point the same
//! routers at real channel/store clients.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServiceConfig;
pub use error::{ApiError, ApiResult};
pub use server::{ingestion_router, run, run_delivery_pump, worker_router};
pub use state::{IngestionState, WorkerState};

//! Router construction, listeners, and the local delivery pump.
//!
//! Two independent axum apps share one process: the ingestion app
//! (`POST /ingest`) and the worker app (`POST /process`). Each handler runs
//! as its own tokio task; the only shared pieces are the injected channel
//! and store clients.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use channel::{MemoryChannel, PushEnvelope};
use metrics_exporter_prometheus::PrometheusHandle;
use store::MemoryStore;
use tokio::sync::mpsc;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};
use worker::Dispatcher;

use crate::config::ServiceConfig;
use crate::middleware::request_id;
use crate::routes::{health, ingestion, worker as worker_routes};
use crate::state::{IngestionState, WorkerState};

/// Build the ingestion app router.
///
/// `metrics` is the Prometheus render handle; tests pass `None` to skip the
/// exporter route.
pub fn ingestion_router(state: IngestionState, metrics: Option<PrometheusHandle>) -> Router {
    let timeout = state.config.timeout();
    let max_body = state.config.max_body_bytes;

    let mut router = Router::new()
        .route("/", get(health::ingestion_health))
        .route("/ingest", post(ingestion::ingest_log));

    if let Some(handle) = metrics {
        router = router.route("/metrics", get(move || async move { handle.render() }));
    }

    router
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the worker app router.
pub fn worker_router(state: WorkerState, config: &ServiceConfig) -> Router {
    Router::new()
        .route("/", get(health::worker_health))
        .route("/process", post(worker_routes::process_push))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.timeout(),
        ))
        .layer(from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run both services in one process, wired through the in-memory channel and
/// store. Blocks until SIGTERM/Ctrl+C.
pub async fn run(config: ServiceConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(config.log_level.as_str())
        .with_target(false)
        .json()
        .init();

    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|err| anyhow::anyhow!("failed to install metrics recorder: {err}"))?;

    let config = Arc::new(config);
    let store = Arc::new(MemoryStore::new());
    let (channel, deliveries) = MemoryChannel::new();
    let dispatcher = Arc::new(Dispatcher::new(store, config.simulator.clone()));

    tokio::spawn(run_delivery_pump(
        deliveries,
        dispatcher.clone(),
        config.delivery_attempts,
        config.redelivery_delay(),
    ));

    let ingestion_app = ingestion_router(
        IngestionState::new(config.clone(), Arc::new(channel)),
        Some(metrics_handle),
    );
    let worker_app = worker_router(WorkerState::new(dispatcher), config.as_ref());

    let ingest_addr = config.ingest_addr()?;
    let worker_addr = config.worker_addr()?;
    info!(
        ingest_addr = %ingest_addr,
        worker_addr = %worker_addr,
        "starting logsift"
    );

    tokio::try_join!(
        serve(ingestion_app, ingest_addr),
        serve(worker_app, worker_addr),
    )?;

    info!("shutdown complete");
    Ok(())
}

async fn serve(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Push deliveries at the dispatcher, retrying transient failures with a
/// fixed delay. This is the local stand-in for the external channel's retry
/// policy; exhausted envelopes are logged as dead-lettered.
pub async fn run_delivery_pump(
    mut deliveries: mpsc::UnboundedReceiver<PushEnvelope>,
    dispatcher: Arc<Dispatcher>,
    max_attempts: u32,
    retry_delay: Duration,
) {
    while let Some(envelope) = deliveries.recv().await {
        deliver_with_retry(&envelope, &dispatcher, max_attempts.max(1), retry_delay).await;
    }
    debug!("delivery pump stopped: channel closed");
}

async fn deliver_with_retry(
    envelope: &PushEnvelope,
    dispatcher: &Dispatcher,
    max_attempts: u32,
    retry_delay: Duration,
) {
    for attempt in 1..=max_attempts {
        match dispatcher.dispatch(envelope).await {
            Ok(completion) => {
                debug!(
                    message_id = %envelope.message_id(),
                    tenant_id = %completion.key.tenant_id,
                    log_id = %completion.key.log_id,
                    outcome = ?completion.outcome,
                    attempt,
                    "delivery acknowledged"
                );
                return;
            }
            Err(err) if !err.is_retryable() => {
                warn!(
                    message_id = %envelope.message_id(),
                    error = %err,
                    "dropping terminal envelope"
                );
                return;
            }
            Err(err) if attempt < max_attempts => {
                warn!(
                    message_id = %envelope.message_id(),
                    error = %err,
                    attempt,
                    "delivery failed; will retry"
                );
                tokio::time::sleep(retry_delay).await;
            }
            Err(err) => {
                error!(
                    message_id = %envelope.message_id(),
                    error = %err,
                    attempts = max_attempts,
                    "redelivery budget exhausted; dead-lettering envelope"
                );
            }
        }
    }
}

/// Shutdown signal handler.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

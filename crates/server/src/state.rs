use std::sync::Arc;

use channel::LogPublisher;
use worker::Dispatcher;

use crate::config::ServiceConfig;

/// Shared state of the ingestion app. The publisher is the long-lived
/// channel client, injected at startup and shared by every handler.
#[derive(Clone)]
pub struct IngestionState {
    pub config: Arc<ServiceConfig>,
    pub publisher: Arc<dyn LogPublisher>,
}

impl IngestionState {
    pub fn new(config: Arc<ServiceConfig>, publisher: Arc<dyn LogPublisher>) -> Self {
        Self { config, publisher }
    }
}

/// Shared state of the worker app.
#[derive(Clone)]
pub struct WorkerState {
    pub dispatcher: Arc<Dispatcher>,
}

impl WorkerState {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use channel::PushEnvelope;
use metrics::counter;
use serde::Serialize;
use worker::DispatchOutcome;

use crate::error::{ApiError, ApiResult};
use crate::state::WorkerState;

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub status: &'static str,
    pub tenant_id: String,
    pub log_id: String,
}

/// Receive one pushed delivery and drive it through the pipeline.
///
/// Status codes are the acknowledgment protocol: 202 and 409 acknowledge the
/// delivery (fresh commit and duplicate respectively), 400 rejects it
/// without requesting redelivery, 500 withholds acknowledgment so the
/// channel redelivers later.
pub async fn process_push(
    State(state): State<WorkerState>,
    body: Bytes,
) -> ApiResult<Response> {
    let envelope: PushEnvelope = serde_json::from_slice(&body).map_err(|err| {
        counter!("worker_malformed_envelopes_total").increment(1);
        ApiError::MalformedEnvelope(err.to_string())
    })?;

    let completion = state.dispatcher.dispatch(&envelope).await?;

    let (status, label) = match completion.outcome {
        DispatchOutcome::Committed => (StatusCode::ACCEPTED, "processed"),
        DispatchOutcome::Duplicate => (StatusCode::CONFLICT, "duplicate"),
    };

    Ok((
        status,
        Json(ProcessResponse {
            status: label,
            tenant_id: completion.key.tenant_id,
            log_id: completion.key.log_id,
        }),
    )
        .into_response())
}

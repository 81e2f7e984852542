use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use metrics::counter;
use serde::Serialize;
use tracing::info;

use crate::error::ApiResult;
use crate::state::IngestionState;

/// Body of the 202 returned once the channel has accepted the record.
#[derive(Debug, Serialize)]
pub struct IngestAccepted {
    pub status: &'static str,
    pub message_id: String,
    pub log_id: String,
    pub tenant_id: String,
}

/// Accept a log record, normalize it, publish it, acknowledge the caller.
///
/// The 202 is only returned after the channel confirms acceptance, so an
/// accepted record is durable even though processing happens later.
pub async fn ingest_log(
    State(state): State<IngestionState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    let tenant_header = headers
        .get(state.config.ingest.tenant_header.as_str())
        .and_then(|v| v.to_str().ok());

    let message = match ingest::normalize(content_type, tenant_header, &body, &state.config.ingest)
    {
        Ok(message) => message,
        Err(err) => {
            counter!("ingest_rejected_total").increment(1);
            return Err(err.into());
        }
    };

    let message_id = match state.publisher.publish(&message).await {
        Ok(message_id) => message_id,
        Err(err) => {
            counter!("ingest_publish_failures_total").increment(1);
            return Err(err.into());
        }
    };

    counter!("ingest_accepted_total").increment(1);
    info!(
        tenant_id = %message.tenant_id,
        log_id = %message.log_id,
        message_id = %message_id,
        source = %message.source,
        "record accepted"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(IngestAccepted {
            status: "accepted",
            message_id,
            log_id: message.log_id,
            tenant_id: message.tenant_id,
        }),
    ))
}

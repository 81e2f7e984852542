use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Liveness probe of the ingestion app.
pub async fn ingestion_health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "ingestion",
    }))
}

/// Liveness probe of the worker app.
pub async fn worker_health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "worker",
    }))
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP-facing error taxonomy.
///
/// Duplicates are deliberately absent: a duplicate delivery is a successful
/// outcome (409 with a success-shaped body), never an error.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed ingestion input. Not retried, not published.
    #[error("validation failed: {0}")]
    Validation(#[from] ingest::NormalizeError),

    /// Undecodable push envelope. Not retried: the channel must not
    /// redeliver a payload that can never decode.
    #[error("malformed push envelope: {0}")]
    MalformedEnvelope(String),

    /// Channel refused the publish; the caller may retry the request.
    #[error("publish failed: {0}")]
    Publish(#[from] channel::ChannelError),

    /// Transient processing/storage fault; the delivery stays
    /// unacknowledged so the channel redelivers it.
    #[error("processing failed: {0}")]
    Processing(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::MalformedEnvelope(_) => StatusCode::BAD_REQUEST,
            ApiError::Publish(_) | ApiError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::MalformedEnvelope(_) => "MALFORMED_ENVELOPE",
            ApiError::Publish(_) => "PUBLISH_FAILED",
            ApiError::Processing(_) => "PROCESSING_FAILED",
        }
    }
}

impl From<worker::DispatchError> for ApiError {
    fn from(err: worker::DispatchError) -> Self {
        match err {
            worker::DispatchError::MalformedEnvelope(inner) => {
                ApiError::MalformedEnvelope(inner.to_string())
            }
            worker::DispatchError::Store(inner) => ApiError::Processing(inner.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
            }
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let err = ApiError::Validation(ingest::NormalizeError::MissingField("tenant_id"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn malformed_envelope_maps_to_400() {
        let err = ApiError::MalformedEnvelope("bad base64".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn infra_faults_map_to_500() {
        let publish = ApiError::Publish(channel::ChannelError::PublishFailed("down".into()));
        assert_eq!(publish.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let processing = ApiError::Processing("store unavailable".into());
        assert_eq!(processing.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use proctor_common::error::ProctorError;
use proctor_sync::error::SyncError;

pub enum ApiError {
    Sync(SyncError),
    Db(ProctorError),
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        Self::Sync(err)
    }
}

impl From<ProctorError> for ApiError {
    fn from(err: ProctorError) -> Self {
        Self::Db(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Sync(err @ SyncError::AlreadyRunning(_)) => {
                (StatusCode::CONFLICT, err.to_string())
            }
            Self::Sync(err @ SyncError::Source(_)) => (StatusCode::BAD_GATEWAY, err.to_string()),
            Self::Sync(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            Self::Db(ProctorError::NotFound(msg)) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Db(ProctorError::Validation(msg)) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Db(other) => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        };

        let body = serde_json::json!({ "error": message });
        (status, Json(body)).into_response()
    }
}

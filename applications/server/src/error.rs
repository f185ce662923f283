/// Server error types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jukebox_core::JukeboxError;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Jukebox(#[from] JukeboxError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] jukebox_storage::StorageError),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::Jukebox(e) => match e {
                JukeboxError::RecordNotFound { .. } | JukeboxError::QueueEmpty(_) => {
                    StatusCode::NOT_FOUND
                }
                JukeboxError::InvalidInput(_) | JukeboxError::InvalidBackend(_) => {
                    StatusCode::BAD_REQUEST
                }
                JukeboxError::Source { .. } => StatusCode::BAD_GATEWAY,
                JukeboxError::ThirdPartyAuthRequired(_) => StatusCode::UNAUTHORIZED,
                JukeboxError::RecordNotSaved { .. }
                | JukeboxError::RecordDeleteFailed { .. }
                | JukeboxError::Database(_)
                | JukeboxError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Config(_) | ServerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        let error_message = if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

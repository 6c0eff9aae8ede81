use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Store-level failure. The driver message is surfaced to the caller
    /// verbatim so missing tables, bad columns, and connectivity loss are
    /// diagnosable from the response alone.
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Invalid file type")]
    UnsupportedFileType,

    #[error("Failed to parse file: {0}")]
    FileParse(String),

    #[error("cannot store {value} in {kind} column {column}")]
    BadCell {
        column: String,
        kind: &'static str,
        value: String,
    },

    #[error("{0}")]
    Multipart(#[from] MultipartError),
}

/// Implement IntoResponse to convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::BadCell { .. } => {
                tracing::error!("Insert failed: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::FileParse(_) => {
                tracing::error!("{}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::UnsupportedFileType => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Multipart(ref e) => (StatusCode::BAD_REQUEST, e.to_string()),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Result type alias for application results
pub type Result<T> = std::result::Result<T, AppError>;

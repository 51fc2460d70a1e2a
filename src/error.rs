use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Nothing servable exists at the requested path.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Remote address rejected by the allow-list.
    #[error("Forbidden")]
    Forbidden,

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decode, resize or encode error.
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Forbidden => return StatusCode::FORBIDDEN.into_response(),
            AppError::NotFound(_) => {
                tracing::debug!(error = %self, "Request error");
                return (StatusCode::NOT_FOUND, self.to_string()).into_response();
            }
            _ => {}
        }

        tracing::error!(error = %self, "Request error");

        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

/// Result type alias for the application.
pub type Result<T> = std::result::Result<T, AppError>;

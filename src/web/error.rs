use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::library::LibraryError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Please sign in.".to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            // The cause was logged where it happened; clients get a generic message.
            AppError::InternalServerError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong, please try again.".to_string(),
            ),
        };
        (status, Json(serde_json::json!({ "error": error_message }))).into_response()
    }
}

impl From<LibraryError> for AppError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::Validation(msg) => AppError::InvalidInput(msg),
            LibraryError::Auth => AppError::InvalidCredentials,
            LibraryError::NotFound(what) => AppError::NotFound(format!("{what} not found")),
            LibraryError::Backend(msg) => AppError::InternalServerError(msg),
        }
    }
}

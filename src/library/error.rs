use thiserror::Error;
use tracing::error;

/// Every failure a library operation can report. None of them are retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Not signed in")]
    Auth,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type Result<T, E = LibraryError> = std::result::Result<T, E>;

impl LibraryError {
    pub fn validation(msg: impl Into<String>) -> Self {
        LibraryError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        LibraryError::NotFound(msg.into())
    }

    /// Logs the original cause and wraps it as a backend failure.
    pub fn backend(cause: impl std::fmt::Display) -> Self {
        let msg = cause.to_string();
        error!(error = %msg, "Storage backend reported a failure.");
        LibraryError::Backend(msg)
    }
}

impl From<sea_orm::DbErr> for LibraryError {
    fn from(err: sea_orm::DbErr) -> Self {
        LibraryError::backend(format!("database error: {err}"))
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::backend(format!("JSON serialization/deserialization error: {err}"))
    }
}

impl From<std::io::Error> for LibraryError {
    fn from(err: std::io::Error) -> Self {
        LibraryError::backend(format!("I/O error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_conversions_keep_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: LibraryError = io.into();
        match err {
            LibraryError::Backend(msg) => assert!(msg.contains("read-only")),
            other => panic!("unexpected error: {other:?}"),
        }

        let json_err = serde_json::from_str::<Vec<u8>>("not json").unwrap_err();
        assert!(matches!(LibraryError::from(json_err), LibraryError::Backend(_)));
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(LibraryError::Auth.to_string(), "Not signed in");
        assert_eq!(
            LibraryError::validation("name is required").to_string(),
            "Invalid input: name is required"
        );
    }
}

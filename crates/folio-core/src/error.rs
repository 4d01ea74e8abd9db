//! Error types for folio.
//!
//! These are the *unexpected* failures: storage unreachable, corrupted rows,
//! misconfiguration. Expected placement outcomes (not found, scope mismatch,
//! already placed) are reported as [`crate::MoveRejection`] values instead.

use thiserror::Error;

/// Result type alias using folio's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for folio operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A stored record violates a model invariant (unknown status, bad id)
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("company 4".to_string());
        assert_eq!(err.to_string(), "Not found: company 4");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("empty folder name".to_string());
        assert_eq!(err.to_string(), "Invalid input: empty folder name");
    }

    #[test]
    fn test_error_display_corrupt_record() {
        let err = Error::CorruptRecord("document 7 has status 'lost'".to_string());
        assert_eq!(
            err.to_string(),
            "Corrupt record: document 7 has status 'lost'"
        );
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("PORT is not a number".to_string());
        assert_eq!(err.to_string(), "Configuration error: PORT is not a number");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_sqlx_error() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert!(err.to_string().starts_with("Database error:"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}

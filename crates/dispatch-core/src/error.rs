//! Error types for dispatch-board.

use thiserror::Error;

/// Result type alias using dispatch-board's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for dispatch-board operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Job not found
    #[error("Job not found: {0}")]
    JobNotFound(i64),

    /// Truck not found
    #[error("Truck not found: {0}")]
    TruckNotFound(i64),

    /// Form validation failed before any request was issued
    #[error("{0}")]
    Validation(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Conflicting state (duplicate names, stale references)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Backend answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Message suitable for a user-facing notice.
    ///
    /// Backend errors surface only the message text; everything else uses
    /// the display form.
    pub fn user_message(&self) -> String {
        match self {
            Error::Api { message, .. } => message.clone(),
            Error::Validation(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("test resource".to_string());
        assert_eq!(err.to_string(), "Not found: test resource");
    }

    #[test]
    fn test_error_display_job_not_found() {
        let err = Error::JobNotFound(42);
        assert_eq!(err.to_string(), "Job not found: 42");
    }

    #[test]
    fn test_error_display_truck_not_found() {
        let err = Error::TruckNotFound(7);
        assert_eq!(err.to_string(), "Truck not found: 7");
    }

    #[test]
    fn test_error_display_validation_is_bare_message() {
        let err = Error::Validation("Please enter an item name".to_string());
        assert_eq!(err.to_string(), "Please enter an item name");
    }

    #[test]
    fn test_error_display_api() {
        let err = Error::Api {
            status: 404,
            message: "Job not found".to_string(),
        };
        assert_eq!(err.to_string(), "API error (404): Job not found");
    }

    #[test]
    fn test_user_message_api_uses_body_text() {
        let err = Error::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.user_message(), "boom");
    }

    #[test]
    fn test_user_message_request_keeps_prefix() {
        let err = Error::Request("connection refused".to_string());
        assert_eq!(err.user_message(), "Request error: connection refused");
    }

    #[test]
    fn test_error_display_conflict() {
        let err = Error::Conflict("duplicate name".to_string());
        assert_eq!(err.to_string(), "Conflict: duplicate name");
    }

    #[test]
    fn test_error_display_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.to_string().contains("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }
}

//! Core error types for Argus

use thiserror::Error;

/// Main error type for Argus operations
#[derive(Error, Debug)]
pub enum ArgusError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl ArgusError {
    /// Whether the caller may retry the failed operation.
    ///
    /// Only transport failures are retryable; a malformed response from a
    /// collaborator is fatal for the request that triggered it.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ArgusError::Transport(_))
    }
}

/// Result type alias for Argus operations
pub type ArgusResult<T> = Result<T, ArgusError>;

// Conversion implementations for common error types
impl From<serde_json::Error> for ArgusError {
    fn from(err: serde_json::Error) -> Self {
        ArgusError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for ArgusError {
    fn from(err: anyhow::Error) -> Self {
        ArgusError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let io_error = ArgusError::Io(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        assert!(format!("{}", io_error).contains("IO error"));

        let transport = ArgusError::Transport("connection refused".to_string());
        assert_eq!(
            format!("{}", transport),
            "Transport error: connection refused"
        );

        let malformed = ArgusError::MalformedResponse("not JSON".to_string());
        assert_eq!(format!("{}", malformed), "Malformed response: not JSON");

        let config_error = ArgusError::Configuration("missing field".to_string());
        assert_eq!(
            format!("{}", config_error),
            "Configuration error: missing field"
        );

        let not_found = ArgusError::NotFound("taxon 42".to_string());
        assert_eq!(format!("{}", not_found), "Not found: taxon 42");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(ArgusError::Transport("timeout".to_string()).is_retryable());
        assert!(!ArgusError::MalformedResponse("bad body".to_string()).is_retryable());
        assert!(!ArgusError::InvalidInput("negative score".to_string()).is_retryable());
        assert!(!ArgusError::Io(io::Error::new(io::ErrorKind::Other, "disk")).is_retryable());
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let parse_result: Result<serde_json::Value, serde_json::Error> =
            serde_json::from_str("{invalid json}");

        assert!(parse_result.is_err());
        let argus_err: ArgusError = parse_result.unwrap_err().into();
        assert!(matches!(argus_err, ArgusError::Serialization(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let argus_err: ArgusError = io_err.into();

        match argus_err {
            ArgusError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_error_result_type() {
        fn returns_err() -> ArgusResult<String> {
            Err(ArgusError::NotFound("item".to_string()))
        }

        match returns_err().unwrap_err() {
            ArgusError::NotFound(msg) => assert_eq!(msg, "item"),
            _ => panic!("Expected NotFound error"),
        }
    }
}

//! Error types for store operations

use thiserror::Error;

/// Errors that can occur while reading or writing the ROM store
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error during store operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Key cannot be mapped onto the backend (empty, `..`, path separators)
    #[error("Invalid store key: {0:?}")]
    InvalidKey(String),

    /// Invalid store configuration
    #[error("Invalid store configuration: {0}")]
    InvalidConfiguration(String),

    /// Backend refused the operation (e.g. storage not reachable)
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Backend-specific error
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_error_display() {
        let err = StoreError::InvalidKey("..".to_string());
        assert_eq!(err.to_string(), "Invalid store key: \"..\"");

        let err = StoreError::Unavailable("read-only filesystem".to_string());
        assert!(err.to_string().contains("read-only filesystem"));
    }

    #[test]
    fn test_io_conversion() {
        let io = IoError::new(ErrorKind::PermissionDenied, "denied");
        let err: StoreError = io.into();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(err.to_string().starts_with("IO error"));
    }
}

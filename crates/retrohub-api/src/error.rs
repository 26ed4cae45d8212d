//! Error types for catalog API calls

use reqwest::StatusCode;
use thiserror::Error;

/// Message used when the server rejects a request without saying why
pub const DEFAULT_ERROR_MESSAGE: &str = "request failed";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Signed-out user or rejected token, from either the HTTP status or
    /// the response envelope
    #[error("not signed in")]
    Unauthorized,

    /// Envelope with a non-zero result code
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("HTTP status: {0}")]
    HttpStatus(StatusCode),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl ApiError {
    /// True when the caller should send the user to sign in
    pub fn requires_sign_in(&self) -> bool {
        match self {
            Self::Unauthorized => true,
            Self::HttpStatus(status) => *status == StatusCode::UNAUTHORIZED,
            Self::Http(e) => e.status() == Some(StatusCode::UNAUTHORIZED),
            _ => false,
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_sign_in() {
        assert!(ApiError::Unauthorized.requires_sign_in());
        assert!(!ApiError::HttpStatus(StatusCode::NOT_FOUND).requires_sign_in());
        assert!(
            !ApiError::Api {
                code: 500,
                message: DEFAULT_ERROR_MESSAGE.to_string()
            }
            .requires_sign_in()
        );
    }

    #[test]
    fn test_display() {
        let err = ApiError::Api {
            code: 1001,
            message: "game not found".to_string(),
        };
        assert_eq!(err.to_string(), "API error 1001: game not found");
    }
}

//! API error types for the delivery backend client.

use thiserror::Error;

/// Errors that can occur when talking to the delivery backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Authentication failed - missing or expired session.
    #[error("Authentication failed: your session is missing or has expired")]
    Unauthorized,

    /// Permission denied - the account lacks access to the resource.
    #[error("Permission denied: you don't have access to this resource")]
    Forbidden,

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited: please wait before retrying")]
    RateLimited,

    /// Backend server error.
    #[error("Server error: {0}")]
    ServerError(String),

    /// Network or HTTP error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Keyring error when storing/retrieving session tokens.
    #[error("Keyring error: {0}")]
    Keyring(String),

    /// Invalid response from the API.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// The record was changed on the server in the meantime.
    #[error("Conflict: the record was modified on the server. Please refresh and try again")]
    Conflict,

    /// A status mutation was rejected.
    #[error("Failed to update record: {0}")]
    UpdateFailed(String),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Create an error from an HTTP status code.
    pub fn from_status(status: reqwest::StatusCode, context: &str) -> Self {
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound(context.to_string()),
            409 => ApiError::Conflict,
            422 => ApiError::UpdateFailed(context.to_string()),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(format!("HTTP {}: {}", status, context)),
            _ => ApiError::ServerError(format!("Unexpected HTTP {}: {}", status, context)),
        }
    }

    /// Whether a retry of the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ApiError::RateLimited | ApiError::ServerError(_) | ApiError::Network(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_error_from_status_401() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "orders");
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn test_error_from_status_403() {
        let err = ApiError::from_status(StatusCode::FORBIDDEN, "orders");
        assert!(matches!(err, ApiError::Forbidden));
    }

    #[test]
    fn test_error_from_status_404() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, "complaint 17");
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "complaint 17"),
            _ => panic!("Expected NotFound error"),
        }
    }

    #[test]
    fn test_error_from_status_422() {
        let err = ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "already closed");
        match err {
            ApiError::UpdateFailed(msg) => assert_eq!(msg, "already closed"),
            _ => panic!("Expected UpdateFailed error"),
        }
    }

    #[test]
    fn test_error_from_status_429() {
        let err = ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, "orders");
        assert!(matches!(err, ApiError::RateLimited));
    }

    #[test]
    fn test_error_from_status_502() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "orders");
        assert!(matches!(err, ApiError::ServerError(_)));
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_unexpected_status_is_server_error() {
        let err = ApiError::from_status(StatusCode::IM_A_TEAPOT, "orders");
        assert!(err.to_string().contains("Unexpected HTTP 418"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(ApiError::RateLimited.is_transient());
        assert!(ApiError::ServerError("boom".into()).is_transient());
        assert!(!ApiError::Unauthorized.is_transient());
        assert!(!ApiError::NotFound("x".into()).is_transient());
        assert!(!ApiError::Conflict.is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::NotFound("order 12".to_string());
        assert_eq!(err.to_string(), "Resource not found: order 12");
    }
}

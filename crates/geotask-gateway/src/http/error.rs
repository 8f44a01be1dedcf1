/*
[INPUT]:  Error sources (HTTP, API status, serialization, URL)
[OUTPUT]: Structured error types with context
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

use crate::types::TaskId;

/// Main error type for the task gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Task does not exist on the server
    #[error("Task {id} not found")]
    NotFound { id: TaskId },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request timeout
    #[error("Request timeout after {duration}s")]
    Timeout { duration: u64 },
}

impl GatewayError {
    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        GatewayError::Api {
            status: status.as_u16(),
            message: message.into(),
        }
    }

    /// Check if the error means the task is gone
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GatewayError::NotFound { .. } | GatewayError::Api { status: 404, .. }
        )
    }

    /// Check if the server rejected the request (4xx)
    pub fn is_client_error(&self) -> bool {
        match self {
            GatewayError::Api { status, .. } => (400..500).contains(status),
            GatewayError::NotFound { .. } => true,
            _ => false,
        }
    }

    /// Replace a bare 404 with a `NotFound` for the given task
    pub(crate) fn for_task(self, id: TaskId) -> Self {
        match self {
            GatewayError::Api { status: 404, .. } => GatewayError::NotFound { id },
            other => other,
        }
    }
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_creation() {
        let err = GatewayError::api_error(StatusCode::BAD_REQUEST, "Title is required");
        match err {
            GatewayError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Title is required");
            }
            _ => panic!("Expected Api error variant"),
        }
    }

    #[test]
    fn test_error_classification() {
        assert!(GatewayError::NotFound { id: 3 }.is_not_found());
        assert!(GatewayError::api_error(StatusCode::NOT_FOUND, "gone").is_not_found());
        assert!(GatewayError::api_error(StatusCode::UNPROCESSABLE_ENTITY, "bad").is_client_error());
        assert!(!GatewayError::api_error(StatusCode::INTERNAL_SERVER_ERROR, "x").is_client_error());
        assert!(!GatewayError::Timeout { duration: 30 }.is_client_error());
    }

    #[test]
    fn test_for_task_maps_404() {
        let err = GatewayError::api_error(StatusCode::NOT_FOUND, "Not Found").for_task(7);
        assert!(matches!(err, GatewayError::NotFound { id: 7 }));

        let err = GatewayError::api_error(StatusCode::BAD_GATEWAY, "down").for_task(7);
        assert!(matches!(err, GatewayError::Api { status: 502, .. }));
    }
}

//! Client error types

use krill_core::traits::{DirectoryError, GatewayError};
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request rejected as invalid
    #[error("Validation error: {0}")]
    Validation(String),

    /// The server processed the request and returned an error field
    #[error("API error: {0}")]
    Api(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

impl From<ClientError> for DirectoryError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::NotFound(_) => DirectoryError::NotFound,
            other => DirectoryError::Unavailable(other.to_string()),
        }
    }
}

impl From<ClientError> for GatewayError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Api(message) => GatewayError::Rejected(message),
            other => GatewayError::Unavailable(other.to_string()),
        }
    }
}

//! Error types for Google Drive provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Google Drive provider errors
#[derive(Error, Debug)]
pub enum GoogleDriveError {
    /// Authentication failed or token is invalid
    #[error("Authentication failed (status {status_code}): {message}")]
    AuthenticationFailed { status_code: u16, message: String },

    /// API request returned an error
    #[error("Google Drive API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Rate limit still exceeded after the transport's retries
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// File or folder not found
    #[error("Resource not found: {resource_id}")]
    NotFound { resource_id: String },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for Google Drive operations
pub type Result<T> = std::result::Result<T, GoogleDriveError>;

impl From<GoogleDriveError> for BridgeError {
    fn from(error: GoogleDriveError) -> Self {
        match error {
            GoogleDriveError::BridgeError(e) => e,
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}

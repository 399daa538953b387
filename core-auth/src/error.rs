use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid account: {0}")]
    InvalidAccount(String),

    #[error("Stored token for {account} is corrupted: {reason}")]
    TokenCorrupted { account: String, reason: String },

    #[error("Invalid authorization code: {0}")]
    InvalidAuthCode(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Authorization prompt failed: {0}")]
    PromptFailed(String),

    #[error("Token refresh failed: {0}")]
    TokenRefreshFailed(String),

    #[error("Secure storage unavailable: {0}")]
    SecureStorageUnavailable(String),

    #[error("Failed to remove stored token for {account}: {reason}")]
    TokenPurgeFailed { account: String, reason: String },

    #[error("Token for {account} failed validation after {attempts} attempts: {reason}")]
    ValidationFailed {
        account: String,
        attempts: u32,
        reason: String,
    },

    #[error("OAuth configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;

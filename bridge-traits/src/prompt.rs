//! Interactive authorization code entry
//!
//! The out-of-band OAuth flow needs the operator to open a URL and paste back
//! the code the provider shows. This is the only point where the program
//! waits on a human, so it sits behind a trait and can be scripted in tests.

use async_trait::async_trait;

use crate::error::Result;

/// Source of OAuth authorization codes
#[async_trait]
pub trait AuthCodePrompt: Send + Sync {
    /// Show `auth_url` for `account` and wait for the authorization code
    ///
    /// Implementations return the code without surrounding whitespace.
    /// `BridgeError::Cancelled` signals that no code will be provided.
    async fn request_code(&self, account: &str, auth_url: &str) -> Result<String>;
}

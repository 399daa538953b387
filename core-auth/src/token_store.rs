//! Token Persistence
//!
//! Stores one OAuth token per account through the `SecureStore` bridge,
//! keyed by the account identifier. On desktop this is `<dir>/<account>.json`.
//!
//! The stored document uses the field names `access_token`, `token_type`,
//! `refresh_token` and `expiry` (RFC 3339), so token files written by other
//! OAuth2 tooling in that shape load as well.
//!
//! Token values are never logged.
//!
//! ## Example
//!
//! ```no_run
//! use core_auth::{AccountId, OAuthTokens, TokenStore};
//! use std::sync::Arc;
//! # use bridge_traits::storage::SecureStore;
//! # async fn example(secure_store: Arc<dyn SecureStore>) -> core_auth::Result<()> {
//! let token_store = TokenStore::new(secure_store);
//! let account = AccountId::new("alice@example.com")?;
//!
//! let tokens = OAuthTokens::new("ya29...".to_string(), Some("1//0g...".to_string()), 3600);
//! token_store.save(&account, &tokens).await?;
//!
//! let loaded = token_store.load(&account).await?;
//! token_store.remove(&account).await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::types::{AccountId, OAuthTokens};
use bridge_traits::storage::SecureStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Persistence for per-account OAuth tokens
#[derive(Clone)]
pub struct TokenStore {
    secure_store: Arc<dyn SecureStore>,
}

/// On-disk token document
#[derive(Serialize, Deserialize)]
struct StoredTokens {
    access_token: String,
    #[serde(default)]
    token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    expiry: DateTime<Utc>,
}

impl From<&OAuthTokens> for StoredTokens {
    fn from(tokens: &OAuthTokens) -> Self {
        Self {
            access_token: tokens.access_token.clone(),
            token_type: tokens.token_type.clone(),
            refresh_token: tokens.refresh_token.clone(),
            expiry: tokens.expires_at,
        }
    }
}

impl From<StoredTokens> for OAuthTokens {
    fn from(stored: StoredTokens) -> Self {
        OAuthTokens {
            access_token: stored.access_token,
            token_type: stored.token_type,
            refresh_token: stored.refresh_token.filter(|t| !t.is_empty()),
            expires_at: stored.expiry,
        }
    }
}

impl TokenStore {
    pub fn new(secure_store: Arc<dyn SecureStore>) -> Self {
        Self { secure_store }
    }

    /// Persist the token for `account`, replacing any previous one
    pub async fn save(&self, account: &AccountId, tokens: &OAuthTokens) -> Result<()> {
        let stored = StoredTokens::from(tokens);

        let json = serde_json::to_vec(&stored).map_err(|e| {
            AuthError::Other(format!("Failed to serialize tokens: {}", e))
        })?;

        self.secure_store
            .set_secret(account.as_str(), &json)
            .await
            .map_err(|e| {
                warn!(account = %account.redacted(), error = %e, "Failed to store tokens");
                AuthError::SecureStorageUnavailable(e.to_string())
            })?;

        info!(
            account = %account.redacted(),
            has_refresh_token = stored.refresh_token.is_some(),
            "Tokens stored"
        );

        Ok(())
    }

    /// Load the token for `account`
    ///
    /// Returns:
    /// - `Ok(Some(tokens))` if a token document exists and parses
    /// - `Ok(None)` if none exists
    /// - `Err(AuthError::TokenCorrupted)` if the document does not parse; the
    ///   caller decides whether to purge it
    pub async fn load(&self, account: &AccountId) -> Result<Option<OAuthTokens>> {
        let data = self
            .secure_store
            .get_secret(account.as_str())
            .await
            .map_err(|e| {
                warn!(account = %account.redacted(), error = %e, "Failed to read stored tokens");
                AuthError::SecureStorageUnavailable(e.to_string())
            })?;

        let Some(data) = data else {
            debug!(account = %account.redacted(), "No stored tokens");
            return Ok(None);
        };

        let stored: StoredTokens = serde_json::from_slice(&data).map_err(|e| {
            warn!(account = %account.redacted(), error = %e, "Stored tokens are corrupted");
            AuthError::TokenCorrupted {
                account: account.to_string(),
                reason: e.to_string(),
            }
        })?;

        let tokens = OAuthTokens::from(stored);
        debug!(
            account = %account.redacted(),
            expires_at = %tokens.expires_at,
            has_refresh_token = tokens.refresh_token.is_some(),
            "Loaded stored tokens"
        );

        Ok(Some(tokens))
    }

    /// Delete the token for `account`. Succeeds if none exists.
    pub async fn remove(&self, account: &AccountId) -> Result<()> {
        self.secure_store
            .delete_secret(account.as_str())
            .await
            .map_err(|e| {
                warn!(account = %account.redacted(), error = %e, "Failed to delete stored tokens");
                AuthError::SecureStorageUnavailable(e.to_string())
            })?;

        info!(account = %account.redacted(), "Stored tokens removed");
        Ok(())
    }
}

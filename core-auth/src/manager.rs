//! # Authenticator
//!
//! Turns an account identifier into a validated [`Session`].
//!
//! ## Flow
//!
//! 1. Load the stored token. A token that is corrupted, empty or expired is
//!    purged and treated as absent.
//! 2. Without a usable token, run the out-of-band consent flow: show the
//!    authorization URL through the `AuthCodePrompt`, exchange the pasted
//!    code and persist the result (best-effort).
//! 3. Wrap the token in a refreshing [`Session`].
//! 4. Probe the session with one authenticated request. A rejected token is
//!    always purged; if an attempt remains the flow starts over, otherwise
//!    the failure is returned after [`MAX_AUTH_ATTEMPTS`].
//!
//! Purge failures are always fatal: a token that cannot be removed would be
//! loaded again on the next attempt.
//!
//! ## Usage
//!
//! ```no_run
//! use core_auth::{AccountId, Authenticator, OAuthConfig};
//! # async fn example(config: core_runtime::CoreConfig) -> core_auth::Result<()> {
//! let authenticator = Authenticator::new(&config, OAuthConfig::google_drive_from_env()?);
//! let session = authenticator
//!     .authenticate(&AccountId::new("alice@example.com")?)
//!     .await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::oauth::{OAuthConfig, OAuthFlowManager};
use crate::session::Session;
use crate::token_store::TokenStore;
use crate::types::{AccountId, OAuthTokens};
use bridge_traits::http::{HttpClient, HttpRequest};
use bridge_traits::AuthCodePrompt;
use core_runtime::CoreConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Authentication attempts per account before giving up
pub const MAX_AUTH_ATTEMPTS: u32 = 2;

/// Endpoint used to check that a token is accepted
pub const DEFAULT_PROBE_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

pub struct Authenticator {
    flow: Arc<OAuthFlowManager>,
    token_store: TokenStore,
    prompt: Arc<dyn AuthCodePrompt>,
    transport: Arc<dyn HttpClient>,
    exchange_client: Option<Arc<dyn HttpClient>>,
    request_timeout: Duration,
    probe_url: String,
}

impl Authenticator {
    pub fn new(config: &CoreConfig, oauth: OAuthConfig) -> Self {
        Self {
            flow: Arc::new(OAuthFlowManager::new(oauth, config.http_client.clone())),
            token_store: TokenStore::new(config.secure_store.clone()),
            prompt: config.auth_prompt.clone(),
            transport: config.http_client.clone(),
            exchange_client: config.exchange_client.clone(),
            request_timeout: config.request_timeout,
            probe_url: DEFAULT_PROBE_URL.to_string(),
        }
    }

    /// Use a different endpoint for the post-authentication probe
    pub fn with_probe_url(mut self, url: impl Into<String>) -> Self {
        self.probe_url = url.into();
        self
    }

    /// Produce a validated session for `account`
    #[instrument(skip(self, account), fields(account = %account.redacted()))]
    pub async fn authenticate(&self, account: &AccountId) -> Result<Session> {
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(attempt, max_attempts = MAX_AUTH_ATTEMPTS, "Authenticating");

            let tokens = self.obtain_tokens(account).await?;
            let session = Session::new(
                account.clone(),
                tokens,
                self.flow.clone(),
                self.token_store.clone(),
                self.transport.clone(),
                self.request_timeout,
            );

            let reason = match self.probe(&session).await {
                Ok(()) => {
                    info!(attempt, "Account authenticated");
                    return Ok(session);
                }
                Err(reason) => reason,
            };

            self.purge(account).await?;

            if attempt >= MAX_AUTH_ATTEMPTS {
                warn!(attempt, reason = %reason, "Token validation failed, giving up");
                return Err(AuthError::ValidationFailed {
                    account: account.to_string(),
                    attempts: attempt,
                    reason,
                });
            }

            warn!(attempt, reason = %reason, "Token validation failed, re-authenticating");
        }
    }

    /// A usable token from storage, or a new one from the consent flow
    async fn obtain_tokens(&self, account: &AccountId) -> Result<OAuthTokens> {
        match self.token_store.load(account).await {
            Ok(Some(tokens)) if tokens.is_valid() => {
                debug!("Using stored token");
                return Ok(tokens);
            }
            Ok(Some(_)) => {
                info!("Stored token is expired or empty, discarding");
                self.purge(account).await?;
            }
            Ok(None) => {}
            Err(AuthError::TokenCorrupted { reason, .. }) => {
                warn!(reason = %reason, "Stored token is unreadable, discarding");
                self.purge(account).await?;
            }
            Err(e) => {
                warn!(error = %e, "Could not read stored token, requesting consent");
            }
        }

        self.consent(account).await
    }

    async fn consent(&self, account: &AccountId) -> Result<OAuthTokens> {
        let (auth_url, verifier) = self.flow.build_auth_url()?;

        let code = self
            .prompt
            .request_code(account.as_str(), &auth_url)
            .await
            .map_err(|e| AuthError::PromptFailed(e.to_string()))?;

        let tokens = self
            .flow
            .exchange_code(&code, &verifier, self.exchange_client.as_deref())
            .await?;

        if let Err(e) = self.token_store.save(account, &tokens).await {
            warn!(error = %e, "Failed to persist token, continuing with in-memory token");
        }

        Ok(tokens)
    }

    /// One authenticated request through the session
    async fn probe(&self, session: &Session) -> std::result::Result<(), String> {
        match session.execute(HttpRequest::get(self.probe_url.as_str())).await {
            Ok(response) if response.is_success() => Ok(()),
            Ok(response) => Err(format!(
                "probe returned {}: {}",
                response.status,
                response.error_text()
            )),
            Err(e) => Err(e.to_string()),
        }
    }

    async fn purge(&self, account: &AccountId) -> Result<()> {
        self.token_store
            .remove(account)
            .await
            .map_err(|e| AuthError::TokenPurgeFailed {
                account: account.to_string(),
                reason: e.to_string(),
            })
    }
}

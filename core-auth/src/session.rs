//! Authenticated HTTP session
//!
//! A [`Session`] is bound to one account. It implements `HttpClient` itself,
//! so API clients take it as their transport: every request gets the
//! account's `Authorization` header and the default timeout, and the access
//! token is refreshed before it expires.

use crate::oauth::OAuthFlowManager;
use crate::token_store::TokenStore;
use crate::types::{AccountId, OAuthTokens};
use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub struct Session {
    account: AccountId,
    tokens: Mutex<OAuthTokens>,
    flow: Arc<OAuthFlowManager>,
    token_store: TokenStore,
    transport: Arc<dyn HttpClient>,
    request_timeout: Duration,
}

impl Session {
    pub fn new(
        account: AccountId,
        tokens: OAuthTokens,
        flow: Arc<OAuthFlowManager>,
        token_store: TokenStore,
        transport: Arc<dyn HttpClient>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            account,
            tokens: Mutex::new(tokens),
            flow,
            token_store,
            transport,
            request_timeout,
        }
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    /// Snapshot of the current token
    pub async fn tokens(&self) -> OAuthTokens {
        self.tokens.lock().await.clone()
    }

    /// Current token, refreshed first if it is close to expiry.
    ///
    /// The lock is held across the refresh so concurrent callers wait for a
    /// single refresh instead of issuing their own.
    async fn fresh_tokens(&self) -> BridgeResult<OAuthTokens> {
        let mut tokens = self.tokens.lock().await;

        if !tokens.needs_refresh() {
            return Ok(tokens.clone());
        }

        let Some(refresh_token) = tokens.refresh_token.clone() else {
            if tokens.is_valid() {
                return Ok(tokens.clone());
            }
            return Err(BridgeError::OperationFailed(format!(
                "Access token for {} expired and no refresh token is available",
                self.account
            )));
        };

        debug!(account = %self.account.redacted(), "Refreshing access token");
        match self.flow.refresh_access_token(&refresh_token).await {
            Ok(refreshed) => {
                if let Err(e) = self.token_store.save(&self.account, &refreshed).await {
                    warn!(
                        account = %self.account.redacted(),
                        error = %e,
                        "Failed to persist refreshed token, continuing in memory"
                    );
                }
                info!(account = %self.account.redacted(), "Access token refreshed");
                *tokens = refreshed;
                Ok(tokens.clone())
            }
            Err(e) if tokens.is_valid() => {
                warn!(
                    account = %self.account.redacted(),
                    error = %e,
                    "Token refresh failed, using current access token"
                );
                Ok(tokens.clone())
            }
            Err(e) => Err(BridgeError::OperationFailed(format!(
                "Token refresh for {} failed: {}",
                self.account, e
            ))),
        }
    }

    async fn authorize(&self, mut request: HttpRequest) -> BridgeResult<HttpRequest> {
        if !request.has_authorization() {
            let tokens = self.fresh_tokens().await?;
            request = request.header("Authorization", tokens.authorization_header());
        }
        if request.timeout.is_none() {
            request = request.timeout(self.request_timeout);
        }
        Ok(request)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("account", &self.account)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl HttpClient for Session {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        let request = self.authorize(request).await?;
        self.transport.execute(request).await
    }

    async fn execute_with_retry(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> BridgeResult<HttpResponse> {
        let request = self.authorize(request).await?;
        self.transport.execute_with_retry(request, policy).await
    }
}

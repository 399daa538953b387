//! OAuth 2.0 Authorization Flow with PKCE Support
//!
//! Implements the out-of-band authorization-code grant (RFC 6749) with a PKCE
//! challenge (RFC 7636):
//! - Building the authorization URL the operator opens in a browser
//! - Exchanging the pasted authorization code for tokens
//! - Refreshing access tokens
//!
//! The out-of-band redirect never calls back into the tool, so there is no
//! `state` round trip to verify. PKCE still binds the code to this process.
//!
//! Sensitive values (tokens, codes, verifiers) are never logged.
//!
//! # Example
//!
//! ```no_run
//! use core_auth::oauth::{OAuthConfig, OAuthFlowManager};
//! use std::sync::Arc;
//!
//! # async fn example(http_client: Arc<dyn bridge_traits::HttpClient>) -> core_auth::Result<()> {
//! let config = OAuthConfig::google_drive_from_env()?;
//! let flow = OAuthFlowManager::new(config, http_client);
//!
//! let (auth_url, verifier) = flow.build_auth_url()?;
//! println!("Visit: {}", auth_url);
//! let tokens = flow.exchange_code("4/0AX4...", &verifier, None).await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::types::OAuthTokens;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use rand::Rng;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://accounts.google.com/o/oauth2/token";
/// Redirect URI for the copy/paste (out-of-band) flow
pub const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

pub const ENV_CLIENT_ID: &str = "GOOGLE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "GOOGLE_CLIENT_SECRET";

const GOOGLE_DRIVE_SCOPES: &[&str] = &[
    "openid",
    "profile",
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/drive.metadata",
    "https://www.googleapis.com/auth/drive.file",
];

const MAX_REFRESH_ATTEMPTS: u32 = 3;

/// OAuth 2.0 provider configuration.
#[derive(Clone)]
pub struct OAuthConfig {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret (optional for public clients)
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    /// Authorization endpoint URL
    pub auth_url: String,
    /// Token endpoint URL
    pub token_url: String,
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .finish()
    }
}

impl OAuthConfig {
    /// Google Drive configuration for the out-of-band flow
    pub fn google_drive(client_id: impl Into<String>, client_secret: Option<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.filter(|s| !s.is_empty()),
            redirect_uri: OOB_REDIRECT_URI.to_string(),
            scopes: GOOGLE_DRIVE_SCOPES.iter().map(|s| s.to_string()).collect(),
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
        }
    }

    /// Read the client credentials from `GOOGLE_CLIENT_ID` / `GOOGLE_CLIENT_SECRET`
    pub fn google_drive_from_env() -> Result<Self> {
        let client_id = std::env::var(ENV_CLIENT_ID)
            .ok()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                AuthError::Configuration(format!("{} is not set", ENV_CLIENT_ID))
            })?;
        let client_secret = std::env::var(ENV_CLIENT_SECRET).ok();

        if client_secret.as_deref().map_or(true, str::is_empty) {
            warn!("{} is not set, using a public client", ENV_CLIENT_SECRET);
        }

        Ok(Self::google_drive(client_id, client_secret))
    }
}

/// PKCE (Proof Key for Code Exchange) verifier.
///
/// Only the challenge derived from it is sent with the authorization URL;
/// the verifier itself goes to the token endpoint with the code.
#[derive(Clone)]
pub struct PkceVerifier {
    verifier: String,
}

impl PkceVerifier {
    /// Generate a verifier from 32 random bytes, base64url without padding
    pub fn new() -> Self {
        let mut verifier_bytes = [0u8; 32];
        rand::thread_rng().fill(&mut verifier_bytes);
        Self {
            verifier: URL_SAFE_NO_PAD.encode(verifier_bytes),
        }
    }

    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    /// S256 challenge: BASE64URL(SHA256(code_verifier))
    pub fn challenge(&self) -> String {
        let hash = Sha256::digest(self.verifier.as_bytes());
        URL_SAFE_NO_PAD.encode(hash)
    }
}

impl Default for PkceVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PkceVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PkceVerifier")
            .field("verifier", &"[REDACTED]")
            .finish()
    }
}

/// OAuth 2.0 flow manager.
pub struct OAuthFlowManager {
    config: OAuthConfig,
    http_client: Arc<dyn HttpClient>,
}

impl OAuthFlowManager {
    pub fn new(config: OAuthConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http_client,
        }
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Build the authorization URL with PKCE challenge.
    ///
    /// Returns the URL and the verifier that must accompany the code in
    /// [`exchange_code`](Self::exchange_code).
    #[instrument(skip(self))]
    pub fn build_auth_url(&self) -> Result<(String, PkceVerifier)> {
        let verifier = PkceVerifier::new();
        let challenge = verifier.challenge();

        let mut url = Url::parse(&self.config.auth_url)
            .map_err(|e| AuthError::Configuration(format!("Invalid auth URL: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("code_challenge", &challenge)
            .append_pair("code_challenge_method", "S256")
            .append_pair("access_type", "offline");

        debug!("Built authorization URL");

        Ok((url.to_string(), verifier))
    }

    /// Exchange an authorization code for OAuth tokens.
    ///
    /// `override_client`, when given, carries this one request instead of the
    /// manager's client. It is how a relaxed TLS trust setting is confined to
    /// the exchange.
    #[instrument(skip(self, code, verifier, override_client))]
    pub async fn exchange_code(
        &self,
        code: &str,
        verifier: &PkceVerifier,
        override_client: Option<&dyn HttpClient>,
    ) -> Result<OAuthTokens> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AuthError::InvalidAuthCode(
                "authorization code is empty".to_string(),
            ));
        }

        let mut params = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("code_verifier", verifier.verifier()),
        ];
        if let Some(ref client_secret) = self.config.client_secret {
            params.push(("client_secret", client_secret.as_str()));
        }

        let encoded = serde_urlencoded::to_string(&params)
            .map_err(|e| AuthError::Other(format!("Failed to encode token request: {}", e)))?;
        let request =
            HttpRequest::new(HttpMethod::Post, self.config.token_url.clone()).form(encoded);

        let client = override_client.unwrap_or(self.http_client.as_ref());
        debug!(
            override_client = override_client.is_some(),
            "Exchanging authorization code for tokens"
        );

        let response = client
            .execute(request)
            .await
            .map_err(|e| AuthError::NetworkError(e.to_string()))?;

        if !response.is_success() {
            let status = response.status;
            let error_body = response.error_text();
            warn!(status, error = %error_body, "Authorization code exchange rejected");

            return Err(AuthError::InvalidAuthCode(format!(
                "Token endpoint returned {}: {}",
                status, error_body
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .map_err(|e| AuthError::Other(format!("Failed to parse token response: {}", e)))?;

        info!(
            expires_in = token_response.expires_in,
            has_refresh_token = token_response.refresh_token.is_some(),
            "Exchanged authorization code for tokens"
        );

        Ok(token_response.into_tokens(None))
    }

    /// Refresh an access token using a refresh token.
    ///
    /// Server errors are retried with exponential backoff; a 4xx answer means
    /// the refresh token was rejected and is returned immediately.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<OAuthTokens> {
        let mut params = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
        ];
        if let Some(ref client_secret) = self.config.client_secret {
            params.push(("client_secret", client_secret.as_str()));
        }

        let encoded = serde_urlencoded::to_string(&params)
            .map_err(|e| AuthError::Other(format!("Failed to encode token request: {}", e)))?;

        let mut attempts = 0;
        loop {
            attempts += 1;

            let request = HttpRequest::new(HttpMethod::Post, self.config.token_url.clone())
                .form(encoded.clone());

            let response = self
                .http_client
                .execute(request)
                .await
                .map_err(|e| AuthError::TokenRefreshFailed(e.to_string()))?;

            if response.is_success() {
                let token_response: TokenResponse = response.json().map_err(|e| {
                    AuthError::Other(format!("Failed to parse token response: {}", e))
                })?;

                info!(
                    expires_in = token_response.expires_in,
                    "Refreshed access token"
                );

                return Ok(token_response.into_tokens(Some(refresh_token)));
            }

            let status = response.status;
            let error_body = response.error_text();

            if response.is_client_error() {
                warn!(status, error = %error_body, "Token refresh rejected");
                return Err(AuthError::TokenRefreshFailed(format!(
                    "Token endpoint returned {}: {}",
                    status, error_body
                )));
            }

            if attempts >= MAX_REFRESH_ATTEMPTS {
                return Err(AuthError::TokenRefreshFailed(format!(
                    "Token refresh failed after {} attempts. Last error: {} - {}",
                    attempts, status, error_body
                )));
            }

            let delay = Duration::from_millis(100 * 2u64.pow(attempts - 1));
            warn!(
                status,
                attempts,
                delay_ms = delay.as_millis() as u64,
                "Token refresh failed, retrying"
            );
            sleep(delay).await;
        }
    }
}

/// Token endpoint response body
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
    #[serde(default)]
    token_type: Option<String>,
}

fn default_expires_in() -> i64 {
    3600
}

impl TokenResponse {
    /// Convert to tokens, keeping `previous_refresh` when the server did not
    /// rotate the refresh token.
    fn into_tokens(self, previous_refresh: Option<&str>) -> OAuthTokens {
        let refresh_token = self
            .refresh_token
            .or_else(|| previous_refresh.map(str::to_string));
        let mut tokens = OAuthTokens::new(self.access_token, refresh_token, self.expires_in);
        if let Some(token_type) = self.token_type.filter(|t| !t.is_empty()) {
            tokens.token_type = token_type;
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::http::HttpResponse;
    use mockall::mock;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    fn test_config() -> OAuthConfig {
        OAuthConfig {
            client_id: "test-client".to_string(),
            client_secret: Some("secret".to_string()),
            redirect_uri: OOB_REDIRECT_URI.to_string(),
            scopes: vec!["scope1".to_string(), "scope2".to_string()],
            auth_url: "https://provider.test/auth".to_string(),
            token_url: "https://provider.test/token".to_string(),
        }
    }

    fn body_of(request: &HttpRequest) -> String {
        String::from_utf8(request.body.clone().unwrap_or_default().to_vec()).unwrap()
    }

    const TOKEN_JSON: &str = r#"{
        "access_token": "ya29.new",
        "refresh_token": "1//0g",
        "expires_in": 3599,
        "token_type": "Bearer"
    }"#;

    #[test]
    fn test_pkce_verifier_generation() {
        let verifier = PkceVerifier::new();
        assert!(!verifier.verifier().is_empty());
        assert_eq!(verifier.challenge(), verifier.challenge());

        let verifier2 = PkceVerifier::new();
        assert_ne!(verifier.verifier(), verifier2.verifier());
        assert_ne!(verifier.challenge(), verifier2.challenge());
    }

    #[test]
    fn test_pkce_challenge_known_value() {
        // RFC 7636 appendix B
        let verifier = PkceVerifier {
            verifier: "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk".to_string(),
        };
        assert_eq!(
            verifier.challenge(),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_google_drive_config() {
        let config = OAuthConfig::google_drive("id", Some(String::new()));

        assert_eq!(config.redirect_uri, OOB_REDIRECT_URI);
        assert_eq!(config.auth_url, GOOGLE_AUTH_URL);
        assert_eq!(config.token_url, GOOGLE_TOKEN_URL);
        assert!(config.client_secret.is_none());
        assert_eq!(config.scopes.len(), 5);
        assert!(config
            .scopes
            .contains(&"https://www.googleapis.com/auth/drive.metadata".to_string()));
    }

    #[test]
    fn test_config_debug_redacts_secret() {
        let debug = format!("{:?}", test_config());
        assert!(!debug.contains("\"secret\""));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_build_auth_url() {
        let manager = OAuthFlowManager::new(test_config(), Arc::new(MockHttpClient::new()));
        let (url, verifier) = manager.build_auth_url().unwrap();

        assert!(url.starts_with("https://provider.test/auth?"));
        assert!(url.contains("client_id=test-client"));
        assert!(url.contains("redirect_uri=urn%3Aietf%3Awg%3Aoauth%3A2.0%3Aoob"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=scope1+scope2") || url.contains("scope=scope1%20scope2"));
        assert!(url.contains(&format!("code_challenge={}", verifier.challenge())));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(url.contains("access_type=offline"));
    }

    #[test]
    fn test_build_auth_url_invalid_url() {
        let mut config = test_config();
        config.auth_url = "not a valid url".to_string();

        let manager = OAuthFlowManager::new(config, Arc::new(MockHttpClient::new()));
        assert!(matches!(
            manager.build_auth_url(),
            Err(AuthError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_exchange_code_success() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(1).returning(|req| {
            assert_eq!(req.method, HttpMethod::Post);
            assert_eq!(req.url, "https://provider.test/token");
            let body = body_of(&req);
            assert!(body.contains("grant_type=authorization_code"));
            assert!(body.contains("code=4%2F0AX4"));
            assert!(body.contains("code_verifier="));
            assert!(body.contains("client_secret=secret"));
            Ok(HttpResponse::new(200, TOKEN_JSON))
        });

        let manager = OAuthFlowManager::new(test_config(), Arc::new(mock_http));
        let verifier = PkceVerifier::new();
        let tokens = manager
            .exchange_code(" 4/0AX4 \n", &verifier, None)
            .await
            .unwrap();

        assert_eq!(tokens.access_token, "ya29.new");
        assert_eq!(tokens.refresh_token.as_deref(), Some("1//0g"));
        assert!(tokens.is_valid());
    }

    #[tokio::test]
    async fn test_exchange_code_uses_override_client() {
        let mut default_http = MockHttpClient::new();
        default_http.expect_execute().times(0);

        let mut override_http = MockHttpClient::new();
        override_http
            .expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, TOKEN_JSON)));

        let manager = OAuthFlowManager::new(test_config(), Arc::new(default_http));
        let tokens = manager
            .exchange_code("code", &PkceVerifier::new(), Some(&override_http))
            .await
            .unwrap();

        assert_eq!(tokens.access_token, "ya29.new");
    }

    #[tokio::test]
    async fn test_exchange_code_rejected() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .returning(|_| Ok(HttpResponse::new(400, r#"{"error":"invalid_grant"}"#)));

        let manager = OAuthFlowManager::new(test_config(), Arc::new(mock_http));
        let result = manager
            .exchange_code("bad", &PkceVerifier::new(), None)
            .await;

        match result {
            Err(AuthError::InvalidAuthCode(message)) => assert!(message.contains("invalid_grant")),
            other => panic!("Expected InvalidAuthCode, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_exchange_code_transport_failure() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .returning(|_| Err(BridgeError::OperationFailed("TLS handshake".to_string())));

        let manager = OAuthFlowManager::new(test_config(), Arc::new(mock_http));
        let result = manager
            .exchange_code("code", &PkceVerifier::new(), None)
            .await;

        assert!(matches!(result, Err(AuthError::NetworkError(_))));
    }

    #[tokio::test]
    async fn test_exchange_empty_code_skips_request() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(0);

        let manager = OAuthFlowManager::new(test_config(), Arc::new(mock_http));
        let result = manager
            .exchange_code("   ", &PkceVerifier::new(), None)
            .await;

        assert!(matches!(result, Err(AuthError::InvalidAuthCode(_))));
    }

    #[tokio::test]
    async fn test_refresh_keeps_refresh_token() {
        let mut mock_http = MockHttpClient::new();
        mock_http.expect_execute().times(1).returning(|req| {
            let body = body_of(&req);
            assert!(body.contains("grant_type=refresh_token"));
            assert!(body.contains("refresh_token=old-refresh"));
            Ok(HttpResponse::new(
                200,
                r#"{"access_token":"fresh","expires_in":3600}"#,
            ))
        });

        let manager = OAuthFlowManager::new(test_config(), Arc::new(mock_http));
        let tokens = manager.refresh_access_token("old-refresh").await.unwrap();

        assert_eq!(tokens.access_token, "fresh");
        assert_eq!(tokens.refresh_token.as_deref(), Some("old-refresh"));
    }

    #[tokio::test]
    async fn test_refresh_client_error_not_retried() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(400, r#"{"error":"invalid_grant"}"#)));

        let manager = OAuthFlowManager::new(test_config(), Arc::new(mock_http));
        let result = manager.refresh_access_token("revoked").await;

        assert!(matches!(result, Err(AuthError::TokenRefreshFailed(_))));
    }

    #[tokio::test]
    async fn test_refresh_retries_server_errors() {
        let mut mock_http = MockHttpClient::new();
        let mut seq = mockall::Sequence::new();
        mock_http
            .expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(HttpResponse::new(503, "unavailable")));
        mock_http
            .expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(HttpResponse::new(200, TOKEN_JSON)));

        let manager = OAuthFlowManager::new(test_config(), Arc::new(mock_http));
        let tokens = manager.refresh_access_token("refresh").await.unwrap();

        assert_eq!(tokens.access_token, "ya29.new");
        assert_eq!(tokens.refresh_token.as_deref(), Some("1//0g"));
    }

    #[test]
    fn test_token_response_minimal() {
        let response: TokenResponse = serde_json::from_str(r#"{"access_token":"t"}"#).unwrap();
        assert_eq!(response.expires_in, 3600);

        let tokens = response.into_tokens(None);
        assert_eq!(tokens.token_type, "Bearer");
        assert!(tokens.refresh_token.is_none());
    }
}

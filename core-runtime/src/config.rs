//! # Core Configuration Module
//!
//! The configuration system uses a builder to construct a `CoreConfig` that
//! holds the host bridges the core needs. Validation is fail-fast: a missing
//! bridge is reported with an actionable `CapabilityMissing` error instead of
//! surfacing later as a confusing runtime failure.
//!
//! ## Required Dependencies
//!
//! - `HttpClient` - API and token endpoint calls
//! - `SecureStore` - Token persistence
//! - `AuthCodePrompt` - Operator input during the consent flow
//!
//! ## Optional Dependencies
//!
//! - `exchange_client` - Separate `HttpClient` used only for the
//!   authorization-code exchange (e.g. one that trusts a self-signed proxy)
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .http_client(Arc::new(ReqwestHttpClient::new()?))
//!     .secure_store(Arc::new(FileSecureStore::new(".")))
//!     .auth_prompt(Arc::new(ConsolePrompt::stdio()))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{AuthCodePrompt, HttpClient, SecureStore};
use std::sync::Arc;
use std::time::Duration;

/// Default per-request timeout for API calls
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Core configuration.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// HTTP client for API and token requests
    pub http_client: Arc<dyn HttpClient>,

    /// Client used for the authorization-code exchange, if it differs
    pub exchange_client: Option<Arc<dyn HttpClient>>,

    /// Token persistence
    pub secure_store: Arc<dyn SecureStore>,

    /// Operator prompt for authorization codes
    pub auth_prompt: Arc<dyn AuthCodePrompt>,

    /// Timeout attached to every API request
    pub request_timeout: Duration,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("http_client", &"HttpClient { ... }")
            .field(
                "exchange_client",
                &self.exchange_client.as_ref().map(|_| "HttpClient { ... }"),
            )
            .field("secure_store", &"SecureStore { ... }")
            .field("auth_prompt", &"AuthCodePrompt { ... }")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`CoreConfig`]
#[derive(Default)]
pub struct CoreConfigBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    exchange_client: Option<Arc<dyn HttpClient>>,
    secure_store: Option<Arc<dyn SecureStore>>,
    auth_prompt: Option<Arc<dyn AuthCodePrompt>>,
    request_timeout: Option<Duration>,
}

impl CoreConfigBuilder {
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn exchange_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.exchange_client = Some(client);
        self
    }

    pub fn secure_store(mut self, store: Arc<dyn SecureStore>) -> Self {
        self.secure_store = Some(store);
        self
    }

    pub fn auth_prompt(mut self, prompt: Arc<dyn AuthCodePrompt>) -> Self {
        self.auth_prompt = Some(prompt);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<CoreConfig> {
        let http_client = self.http_client.ok_or_else(|| Error::CapabilityMissing {
            capability: "HttpClient".to_string(),
            message: "No HTTP client provided. Desktop: use bridge_desktop::ReqwestHttpClient."
                .to_string(),
        })?;

        let secure_store = self.secure_store.ok_or_else(|| Error::CapabilityMissing {
            capability: "SecureStore".to_string(),
            message: "No credential store provided. Desktop: use bridge_desktop::FileSecureStore."
                .to_string(),
        })?;

        let auth_prompt = self.auth_prompt.ok_or_else(|| Error::CapabilityMissing {
            capability: "AuthCodePrompt".to_string(),
            message: "No authorization prompt provided. Desktop: use bridge_desktop::ConsolePrompt."
                .to_string(),
        })?;

        let config = CoreConfig {
            http_client,
            exchange_client: self.exchange_client,
            secure_store,
            auth_prompt,
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::http::{HttpRequest, HttpResponse};

    struct NullHttp;

    #[async_trait]
    impl HttpClient for NullHttp {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            Err(BridgeError::NotAvailable("offline".to_string()))
        }
    }

    struct NullStore;

    #[async_trait]
    impl SecureStore for NullStore {
        async fn set_secret(&self, _key: &str, _value: &[u8]) -> BridgeResult<()> {
            Ok(())
        }

        async fn get_secret(&self, _key: &str) -> BridgeResult<Option<Vec<u8>>> {
            Ok(None)
        }

        async fn delete_secret(&self, _key: &str) -> BridgeResult<()> {
            Ok(())
        }
    }

    struct NullPrompt;

    #[async_trait]
    impl AuthCodePrompt for NullPrompt {
        async fn request_code(&self, _account: &str, _auth_url: &str) -> BridgeResult<String> {
            Err(BridgeError::Cancelled("test".to_string()))
        }
    }

    #[test]
    fn test_build_with_all_bridges() {
        let config = CoreConfig::builder()
            .http_client(Arc::new(NullHttp))
            .secure_store(Arc::new(NullStore))
            .auth_prompt(Arc::new(NullPrompt))
            .build()
            .unwrap();

        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert!(config.exchange_client.is_none());
    }

    #[test]
    fn test_missing_http_client() {
        let result = CoreConfig::builder()
            .secure_store(Arc::new(NullStore))
            .auth_prompt(Arc::new(NullPrompt))
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "HttpClient")
            }
            other => panic!("Expected CapabilityMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_prompt() {
        let result = CoreConfig::builder()
            .http_client(Arc::new(NullHttp))
            .secure_store(Arc::new(NullStore))
            .build();

        assert!(matches!(
            result,
            Err(Error::CapabilityMissing { ref capability, .. }) if capability == "AuthCodePrompt"
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = CoreConfig::builder()
            .http_client(Arc::new(NullHttp))
            .secure_store(Arc::new(NullStore))
            .auth_prompt(Arc::new(NullPrompt))
            .request_timeout(Duration::ZERO)
            .build();

        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_debug_hides_bridges() {
        let config = CoreConfig::builder()
            .http_client(Arc::new(NullHttp))
            .exchange_client(Arc::new(NullHttp))
            .secure_store(Arc::new(NullStore))
            .auth_prompt(Arc::new(NullPrompt))
            .build()
            .unwrap();

        let debug = format!("{:?}", config);
        assert!(debug.contains("HttpClient { ... }"));
        assert!(debug.contains("request_timeout"));
    }
}

//! HTTP Client Implementation using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy},
};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("drive-permission-migrate/", env!("CARGO_PKG_VERSION"));

/// Certificate validation mode for a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsTrust {
    /// Validate server certificates against the system roots
    #[default]
    Verify,
    /// Accept any certificate, including self-signed ones
    ///
    /// Only meant for the token exchange behind an intercepting proxy.
    AcceptInvalidCerts,
}

/// Reqwest-based HTTP client implementation
///
/// Provides HTTP operations with:
/// - Connection pooling via reqwest
/// - Automatic retry of 429/5xx with exponential backoff
/// - rustls TLS, optionally with certificate validation disabled
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_options(Duration::from_secs(30), TlsTrust::Verify)
    }

    /// Create a new HTTP client with custom timeout and trust mode
    pub fn with_options(timeout: Duration, trust: TlsTrust) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(trust == TlsTrust::AcceptInvalidCerts)
            .build()
            .map_err(|e| {
                BridgeError::NotAvailable(format!("Failed to build HTTP client: {}", e))
            })?;

        if trust == TlsTrust::AcceptInvalidCerts {
            warn!("HTTP client created with certificate validation disabled");
        }

        Ok(Self { client })
    }

    /// Convert bridge HttpMethod to reqwest Method
    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }

    /// Build reqwest request from bridge request
    fn build_request(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let method = Self::convert_method(request.method);
        let mut req = self.client.request(method, &request.url);

        for (key, value) in request.headers {
            req = req.header(key, value);
        }

        if let Some(body) = request.body {
            req = req.body(body);
        }

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        req
    }

    fn should_retry_status(status: u16) -> bool {
        status >= 500 || status == 429
    }

    async fn execute_with_retry_internal(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<HttpResponse> {
        let max_attempts = policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(
                attempt,
                max_attempts,
                method = ?request.method,
                "Executing HTTP request"
            );

            let outcome = match self.build_request(request.clone()).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let headers: HashMap<String, String> = response
                        .headers()
                        .iter()
                        .filter_map(|(k, v)| {
                            v.to_str().ok().map(|s| (k.to_string(), s.to_string()))
                        })
                        .collect();
                    let body = response
                        .bytes()
                        .await
                        .map_err(|e| BridgeError::OperationFailed(e.to_string()))?;

                    Ok(HttpResponse {
                        status,
                        headers,
                        body,
                    })
                }
                Err(e) if e.is_timeout() => Err(BridgeError::OperationFailed(
                    "Request timed out".to_string(),
                )),
                Err(e) if e.is_connect() => Err(BridgeError::OperationFailed(format!(
                    "Connection failed: {}",
                    e
                ))),
                Err(e) => Err(BridgeError::OperationFailed(e.to_string())),
            };

            let retryable = match &outcome {
                Ok(response) => Self::should_retry_status(response.status),
                Err(_) => true,
            };

            if !retryable || attempt >= max_attempts {
                return outcome;
            }

            match &outcome {
                Ok(response) => warn!(
                    status = response.status,
                    attempt, "HTTP request failed with retryable status"
                ),
                Err(e) => warn!(error = %e, attempt, "HTTP request failed"),
            }

            let delay = policy.delay_for(attempt);
            debug!(delay_ms = delay.as_millis() as u64, "Retrying after delay");
            sleep(delay).await;
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.execute_with_retry(request, RetryPolicy::default())
            .await
    }

    async fn execute_with_retry(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<HttpResponse> {
        self.execute_with_retry_internal(request, policy).await
    }
}

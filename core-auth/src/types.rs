use crate::error::{AuthError, Result};
use chrono::{DateTime, Duration, Utc};
use core_runtime::logging::redact_if_sensitive;
use std::fmt;

/// Seconds of clock skew tolerated when judging whether a token is still usable
pub const VALIDITY_SKEW_SECS: i64 = 10;

/// Seconds before expiry at which a session refreshes its access token
pub const REFRESH_BUFFER_SECS: i64 = 300;

/// Identifier of an authenticated account.
///
/// The operator-supplied email address. It is used verbatim as the key of
/// the account's persisted token, so it must be non-empty.
///
/// # Examples
///
/// ```
/// use core_auth::AccountId;
///
/// let account = AccountId::new("alice@example.com").unwrap();
/// assert_eq!(account.as_str(), "alice@example.com");
/// assert!(AccountId::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(AuthError::InvalidAccount(
                "account identifier must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Form of the identifier that may appear in log lines
    pub fn redacted(&self) -> String {
        redact_if_sensitive("account", &self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// OAuth 2.0 token set.
///
/// Tokens should never be logged. The `Debug` implementation redacts them.
///
/// # Examples
///
/// ```
/// use core_auth::OAuthTokens;
///
/// let tokens = OAuthTokens::new("ya29.a0".to_string(), Some("1//0g".to_string()), 3600);
/// assert!(tokens.is_valid());
/// assert!(!tokens.needs_refresh());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthTokens {
    /// The access token used for API requests
    pub access_token: String,
    /// Authorization scheme, normally `Bearer`
    pub token_type: String,
    /// The refresh token used to obtain new access tokens
    pub refresh_token: Option<String>,
    /// When the access token expires (UTC)
    pub expires_at: DateTime<Utc>,
}

impl OAuthTokens {
    /// Create a bearer token set expiring `expires_in` seconds from now
    pub fn new(access_token: String, refresh_token: Option<String>, expires_in: i64) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            refresh_token,
            expires_at: Utc::now() + Duration::seconds(expires_in),
        }
    }

    /// Whether the token can be used as-is: non-empty and not expired
    /// (allowing [`VALIDITY_SKEW_SECS`] of skew).
    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty() && !self.is_expired_with_buffer(VALIDITY_SKEW_SECS)
    }

    /// Whether the access token is close enough to expiry to refresh it
    pub fn needs_refresh(&self) -> bool {
        self.is_expired_with_buffer(REFRESH_BUFFER_SECS)
    }

    pub fn is_expired_with_buffer(&self, buffer_seconds: i64) -> bool {
        Utc::now() >= self.expires_at - Duration::seconds(buffer_seconds)
    }

    /// Get the time remaining until token expiration
    ///
    /// Returns `None` if the token is already expired.
    pub fn time_until_expiry(&self) -> Option<Duration> {
        let now = Utc::now();
        if now >= self.expires_at {
            None
        } else {
            Some(self.expires_at - now)
        }
    }

    /// Value for the `Authorization` header
    pub fn authorization_header(&self) -> String {
        let scheme = if self.token_type.is_empty() {
            "Bearer"
        } else {
            self.token_type.as_str()
        };
        format!("{} {}", scheme, self.access_token)
    }
}

// Custom Debug implementation to avoid logging tokens
impl fmt::Debug for OAuthTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthTokens")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_redacted_for_logs() {
        let account = AccountId::new("alice@example.com").unwrap();

        assert_eq!(account.redacted(), "a***@[REDACTED]");
        // The storage key keeps the full identifier
        assert_eq!(account.to_string(), "alice@example.com");

        let plain = AccountId::new("service-account").unwrap();
        assert_eq!(plain.redacted(), "service-account");
    }

    fn tokens_expiring_at(expires_at: DateTime<Utc>) -> OAuthTokens {
        OAuthTokens {
            access_token: "token".to_string(),
            token_type: "Bearer".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at,
        }
    }

    #[test]
    fn test_account_id_rejects_empty() {
        assert!(AccountId::new("").is_err());
        assert!(AccountId::new("   ").is_err());
        assert_eq!(
            AccountId::new("a@example.com").unwrap().to_string(),
            "a@example.com"
        );
    }

    #[test]
    fn test_oauth_tokens_new() {
        let tokens = OAuthTokens::new("access".to_string(), None, 3600);
        assert_eq!(tokens.access_token, "access");
        assert_eq!(tokens.token_type, "Bearer");
        assert!(tokens.refresh_token.is_none());
        assert!(tokens.time_until_expiry().is_some());
    }

    #[test]
    fn test_valid_fresh_token() {
        let tokens = tokens_expiring_at(Utc::now() + Duration::hours(1));
        assert!(tokens.is_valid());
        assert!(!tokens.needs_refresh());
    }

    #[test]
    fn test_empty_access_token_is_invalid() {
        let mut tokens = tokens_expiring_at(Utc::now() + Duration::hours(1));
        tokens.access_token.clear();
        assert!(!tokens.is_valid());
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let tokens = tokens_expiring_at(Utc::now() - Duration::hours(1));
        assert!(!tokens.is_valid());
        assert!(tokens.time_until_expiry().is_none());
    }

    #[test]
    fn test_token_inside_skew_is_invalid() {
        let tokens = tokens_expiring_at(Utc::now() + Duration::seconds(5));
        assert!(!tokens.is_valid());
    }

    #[test]
    fn test_token_near_expiry_needs_refresh_but_is_valid() {
        let tokens = tokens_expiring_at(Utc::now() + Duration::seconds(200));
        assert!(tokens.is_valid());
        assert!(tokens.needs_refresh());
    }

    #[test]
    fn test_authorization_header() {
        let mut tokens = tokens_expiring_at(Utc::now() + Duration::hours(1));
        assert_eq!(tokens.authorization_header(), "Bearer token");

        tokens.token_type.clear();
        assert_eq!(tokens.authorization_header(), "Bearer token");
    }

    #[test]
    fn test_oauth_tokens_debug_redacts() {
        let tokens = OAuthTokens {
            access_token: "secret_access_token".to_string(),
            token_type: "Bearer".to_string(),
            refresh_token: Some("secret_refresh_token".to_string()),
            expires_at: Utc::now(),
        };
        let debug_str = format!("{:?}", tokens);
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("secret_access_token"));
        assert!(!debug_str.contains("secret_refresh_token"));
    }
}

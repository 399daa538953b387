//! # Authentication Module
//!
//! Per-account OAuth 2.0 authentication for the Drive API.
//!
//! ## Overview
//!
//! Each account is authenticated independently through the out-of-band
//! authorization-code flow. Tokens are persisted per account, validated with
//! a probe request and re-acquired when they turn out to be unusable.
//!
//! ## Features
//!
//! - OAuth 2.0 out-of-band flow with PKCE
//! - Token persistence keyed by account through the `SecureStore` bridge
//! - Bounded self-healing when a stored token is rejected
//! - Sessions that refresh access tokens before they expire

pub mod error;
pub mod manager;
pub mod oauth;
pub mod session;
pub mod token_store;
pub mod types;

pub use error::{AuthError, Result};
pub use manager::{Authenticator, DEFAULT_PROBE_URL, MAX_AUTH_ATTEMPTS};
pub use oauth::{OAuthConfig, OAuthFlowManager, PkceVerifier};
pub use session::Session;
pub use token_store::TokenStore;
pub use types::{AccountId, OAuthTokens};

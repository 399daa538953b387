//! # Host Bridge Traits
//!
//! Capability traits the core needs from its host, kept separate so the
//! authentication and migration crates can be tested without a network,
//! a terminal or a writable home directory.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations
//! - [`SecureStore`](storage::SecureStore) - Credential persistence
//! - [`ResourceClient`](storage::ResourceClient) - Paginated remote listings
//! - [`AuthCodePrompt`](prompt::AuthCodePrompt) - Operator-supplied OAuth codes
//!
//! Desktop implementations live in `bridge-desktop`; the Drive
//! `ResourceClient` lives in `provider-google-drive`.
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! convert platform errors into it with an actionable message.

pub mod error;
pub mod http;
pub mod prompt;
pub mod storage;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use prompt::AuthCodePrompt;
pub use storage::{
    Owner, Page, Permission, RemoteResource, ResourceClient, ResourceQuery, SecureStore,
    FOLDER_MIME_TYPE,
};

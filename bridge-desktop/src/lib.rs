//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux):
//! - `HttpClient` using `reqwest`
//! - `SecureStore` as one owner-only JSON file per key
//! - `AuthCodePrompt` on the terminal
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ConsolePrompt, FileSecureStore, ReqwestHttpClient};
//!
//! let http_client = ReqwestHttpClient::new()?;
//! let store = FileSecureStore::new(".");
//! let prompt = ConsolePrompt::stdio();
//! ```

mod file_store;
mod http;
mod prompt;

pub use file_store::FileSecureStore;
pub use http::{ReqwestHttpClient, TlsTrust};
pub use prompt::ConsolePrompt;

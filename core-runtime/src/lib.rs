//! # Core Runtime Module
//!
//! Foundational infrastructure shared by the authentication and migration
//! crates:
//! - Logging and tracing setup
//! - Configuration of the host bridges the core depends on

pub mod config;
pub mod error;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};

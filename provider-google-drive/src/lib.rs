//! # Google Drive Provider
//!
//! Implements the `ResourceClient` trait for Google Drive API v3.
//!
//! ## Overview
//!
//! This module provides:
//! - Paginated `files.list` queries by name and by parent folder
//! - Paginated `permissions.list` per file
//! - Mapping of API status codes to typed errors

pub mod connector;
pub mod error;
pub mod types;

pub use connector::GoogleDriveConnector;
pub use error::{GoogleDriveError, Result};

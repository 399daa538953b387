//! # drive-permission-migrate
//!
//! Reads the owners and permissions of every file in a named Drive folder of
//! one account, after resolving a named folder in a second account.
//!
//! [`cli`] parses the command line, [`app`] wires the desktop bridges into
//! the authentication and migration crates.

pub mod app;
pub mod cli;

pub use cli::Args;

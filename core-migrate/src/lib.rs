//! # Folder Migration
//!
//! Resolves a named folder in two independently authenticated accounts and
//! walks the source folder, gathering the owners and permissions of every
//! file it contains.
//!
//! ## Overview
//!
//! - [`FolderResolver`] pages through a name search until the first folder
//!   with that exact name
//! - [`TraversalEngine`] pages through the folder's children and each file's
//!   permissions, handing a [`ResourceRecord`] per file to a [`RecordSink`]
//! - [`Orchestrator`] wires authentication, resolution and traversal for a
//!   [`MigrationPlan`]

pub mod error;
pub mod folder;
pub mod orchestrator;
pub mod resolver;
pub mod traversal;

#[cfg(test)]
mod test_support;

pub use error::{MigrateError, Result};
pub use folder::Folder;
pub use orchestrator::{AccountConnector, DriveAccountConnector, MigrationPlan, Orchestrator};
pub use resolver::FolderResolver;
pub use traversal::{RecordSink, ResourceRecord, TracingSink, TraversalEngine, TraversalSummary};

//! Error types for folder migration

use core_auth::AuthError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Folder '{name}' not found for {account}")]
    FolderNotFound { account: String, name: String },

    #[error("Listing {target} for {account} failed: {reason}")]
    ListingFailed {
        account: String,
        target: String,
        reason: String,
    },

    #[error(transparent)]
    Auth(#[from] AuthError),
}

pub type Result<T> = std::result::Result<T, MigrateError>;

//! File-backed credential storage
//!
//! One JSON file per key, `<dir>/<key>.json`, readable and writable by the
//! owner only.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SecureStore,
};
use core_runtime::logging::{redact_if_sensitive, strip_path};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

/// `SecureStore` that keeps each secret in its own file
pub struct FileSecureStore {
    dir: PathBuf,
}

impl FileSecureStore {
    /// Store secrets under `dir`, which must already exist
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }

    /// Name of the store directory, without the rest of its path
    fn dir_name(&self) -> String {
        strip_path(&self.dir.to_string_lossy()).to_string()
    }

    async fn write_private(path: &Path, value: &[u8]) -> Result<()> {
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(FILE_MODE);

        let mut file = options.open(path).await?;
        file.write_all(value).await?;
        file.sync_all().await?;
        Ok(())
    }
}

/// Keys are account emails; only a masked form goes into log lines
fn log_key(key: &str) -> String {
    redact_if_sensitive("key", key)
}

fn validate_key(key: &str) -> Result<()> {
    let invalid = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\', '\0']);

    if invalid {
        return Err(BridgeError::OperationFailed(format!(
            "Invalid credential key: {:?}",
            key
        )));
    }
    Ok(())
}

#[async_trait]
impl SecureStore for FileSecureStore {
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        // Written next to the target and renamed so a read-only file left by
        // an earlier run does not block the update.
        let staging = self.dir.join(format!(".{}.json.tmp", key));

        if let Err(e) = Self::write_private(&staging, value).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e);
        }
        tokio::fs::rename(&staging, &path).await?;

        debug!(key = %log_key(key), dir = %self.dir_name(), "Stored secret on disk");
        Ok(())
    }

    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;

        match tokio::fs::read(&path).await {
            Ok(data) => {
                debug!(key = %log_key(key), "Read secret from disk");
                Ok(Some(data))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(key = %log_key(key), "Secret file not found");
                Ok(None)
            }
            Err(e) => {
                warn!(
                    key = %log_key(key),
                    dir = %self.dir_name(),
                    error = %e,
                    "Failed to read secret file"
                );
                Err(e.into())
            }
        }
    }

    async fn delete_secret(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key = %log_key(key), "Deleted secret file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(key = %log_key(key), "Secret file not found (already deleted)");
                Ok(())
            }
            Err(e) => {
                warn!(
                    key = %log_key(key),
                    dir = %self.dir_name(),
                    error = %e,
                    "Failed to delete secret file"
                );
                Err(e.into())
            }
        }
    }

    async fn has_secret(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }
}

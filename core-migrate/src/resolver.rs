//! Folder lookup by display name

use bridge_traits::storage::{ResourceClient, ResourceQuery};
use core_auth::AccountId;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::error::{MigrateError, Result};
use crate::folder::Folder;

/// Resolves a human-readable folder name to a [`Folder`].
///
/// The search is filtered server side by name and paged until a match is
/// found. Duplicate names are not detected: the first folder in listing
/// order wins, and pages after the one holding it are never fetched.
pub struct FolderResolver;

impl FolderResolver {
    #[instrument(skip(client, account), fields(account = %account.redacted()))]
    pub async fn resolve(
        client: Arc<dyn ResourceClient>,
        account: &AccountId,
        name: &str,
    ) -> Result<Folder> {
        let query = ResourceQuery::NameEquals(name.to_string());
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = client
                .list_resources(&query, cursor.as_deref())
                .await
                .map_err(|e| MigrateError::ListingFailed {
                    account: account.to_string(),
                    target: format!("folders named '{}'", name),
                    reason: e.to_string(),
                })?;
            pages += 1;

            // The server filter may be looser than an exact comparison
            if let Some(found) = page
                .items
                .iter()
                .find(|resource| resource.is_folder() && resource.name == name)
            {
                info!(folder_id = %found.id, pages, "Folder resolved");
                return Ok(Folder::new(
                    client.clone(),
                    found.id.clone(),
                    found.name.clone(),
                    account.clone(),
                ));
            }

            match page.next_cursor() {
                Some(next) => cursor = Some(next.to_string()),
                None => break,
            }
            debug!(pages, "No match on page, continuing");
        }

        Err(MigrateError::FolderNotFound {
            account: account.to_string(),
            name: name.to_string(),
        })
    }
}

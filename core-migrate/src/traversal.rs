//! Folder traversal and permission enumeration
//!
//! Walks the direct children of a source folder, skips nested folders, and
//! drains the permission list of every file. Each file produces one
//! [`ResourceRecord`] handed to a [`RecordSink`].
//!
//! A failed folder listing aborts the traversal, since a partial listing
//! would under-report. A failed permission page only affects its file: the
//! record is emitted with the permissions gathered so far and flagged
//! incomplete.

use bridge_traits::storage::{Permission, RemoteResource, ResourceQuery};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::error::{MigrateError, Result};
use crate::folder::Folder;

/// One file discovered in the source folder together with its grants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub resource: RemoteResource,
    pub permissions: Vec<Permission>,
    /// `false` when a permission page failed and later pages were skipped
    pub permissions_complete: bool,
}

/// Receives records as the traversal produces them
pub trait RecordSink: Send + Sync {
    fn record(&self, record: &ResourceRecord);
}

/// Reports every record through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl RecordSink for TracingSink {
    fn record(&self, record: &ResourceRecord) {
        let owners: Vec<&str> = record
            .resource
            .owners
            .iter()
            .filter_map(|owner| owner.email_address.as_deref())
            .collect();

        info!(
            file_id = %record.resource.id,
            name = %record.resource.name,
            mime_type = %record.resource.mime_type,
            owned_by_me = record.resource.owned_by_me,
            owners = ?owners,
            permissions = record.permissions.len(),
            complete = record.permissions_complete,
            "File"
        );

        for permission in &record.permissions {
            info!(
                file_id = %record.resource.id,
                permission_id = %permission.id,
                grantee_type = %permission.permission_type,
                role = %permission.role,
                email = permission.email_address.as_deref().unwrap_or(""),
                domain = permission.domain.as_deref().unwrap_or(""),
                allow_file_discovery = ?permission.allow_file_discovery,
                expiration_time = permission.expiration_time.as_deref().unwrap_or(""),
                deleted = permission.deleted,
                "Permission"
            );
        }
    }
}

/// Counters for one traversal
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TraversalSummary {
    pub files: usize,
    pub folders_skipped: usize,
    pub permissions: usize,
    /// Files whose permission listing stopped early
    pub incomplete: usize,
    /// Folder listing pages fetched
    pub pages: usize,
}

pub struct TraversalEngine {
    sink: Arc<dyn RecordSink>,
}

impl TraversalEngine {
    pub fn new(sink: Arc<dyn RecordSink>) -> Self {
        Self { sink }
    }

    /// Migrate `source` into `destination`.
    ///
    /// Only the discovery side exists today: the destination is resolved
    /// and logged but nothing is written to it.
    #[instrument(skip_all, fields(source = %source.name(), destination = %destination.name()))]
    pub async fn migrate(&self, source: &Folder, destination: &Folder) -> Result<TraversalSummary> {
        info!(
            source_account = %source.account().redacted(),
            source_id = %source.id(),
            destination_account = %destination.account().redacted(),
            destination_id = %destination.id(),
            "Starting folder migration"
        );
        self.traverse(source).await
    }

    /// Enumerate every file directly inside `folder`
    pub async fn traverse(&self, folder: &Folder) -> Result<TraversalSummary> {
        let query = ResourceQuery::ChildrenOf(folder.id().to_string());
        let mut summary = TraversalSummary::default();
        let mut cursor: Option<String> = None;

        loop {
            let page = folder
                .client()
                .list_resources(&query, cursor.as_deref())
                .await
                .map_err(|e| MigrateError::ListingFailed {
                    account: folder.account().to_string(),
                    target: format!("folder '{}'", folder.name()),
                    reason: e.to_string(),
                })?;
            summary.pages += 1;

            let next = page.next_cursor().map(str::to_string);

            for resource in page.items {
                if resource.is_folder() {
                    info!(folder_id = %resource.id, name = %resource.name, "Skipping nested folder");
                    summary.folders_skipped += 1;
                    continue;
                }

                let record = self.collect_permissions(folder, resource).await;
                summary.files += 1;
                summary.permissions += record.permissions.len();
                if !record.permissions_complete {
                    summary.incomplete += 1;
                }
                self.sink.record(&record);
            }

            match next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(summary)
    }

    async fn collect_permissions(&self, folder: &Folder, resource: RemoteResource) -> ResourceRecord {
        let mut permissions = Vec::new();
        let mut cursor: Option<String> = None;
        let mut complete = true;

        loop {
            match folder
                .client()
                .list_permissions(&resource.id, cursor.as_deref())
                .await
            {
                Ok(page) => {
                    let next = page.next_cursor().map(str::to_string);
                    permissions.extend(page.items);
                    match next {
                        Some(next) => cursor = Some(next),
                        None => break,
                    }
                }
                Err(e) => {
                    warn!(
                        file_id = %resource.id,
                        name = %resource.name,
                        gathered = permissions.len(),
                        error = %e,
                        "Permission listing failed, skipping remaining pages"
                    );
                    complete = false;
                    break;
                }
            }
        }

        ResourceRecord {
            resource,
            permissions,
            permissions_complete: complete,
        }
    }
}

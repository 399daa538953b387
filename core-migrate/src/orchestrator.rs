//! Two-account migration run
//!
//! Authenticates the source and destination accounts one after the other,
//! resolves both folders and traverses the source.

use async_trait::async_trait;
use bridge_traits::storage::ResourceClient;
use core_auth::{AccountId, Authenticator};
use provider_google_drive::GoogleDriveConnector;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::error::Result;
use crate::resolver::FolderResolver;
use crate::traversal::{RecordSink, TraversalEngine, TraversalSummary};

/// Produces an authenticated listing client for an account
#[async_trait]
pub trait AccountConnector: Send + Sync {
    async fn connect(&self, account: &AccountId) -> Result<Arc<dyn ResourceClient>>;
}

/// Authenticates through [`Authenticator`] and talks to Drive over the
/// resulting session
pub struct DriveAccountConnector {
    authenticator: Authenticator,
}

impl DriveAccountConnector {
    pub fn new(authenticator: Authenticator) -> Self {
        Self { authenticator }
    }
}

#[async_trait]
impl AccountConnector for DriveAccountConnector {
    async fn connect(&self, account: &AccountId) -> Result<Arc<dyn ResourceClient>> {
        let session = self.authenticator.authenticate(account).await?;
        Ok(Arc::new(GoogleDriveConnector::new(Arc::new(session))))
    }
}

/// What to migrate, and between which accounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPlan {
    pub source_account: AccountId,
    pub destination_account: AccountId,
    pub source_folder: String,
    pub destination_folder: String,
}

pub struct Orchestrator {
    connector: Arc<dyn AccountConnector>,
    engine: TraversalEngine,
}

impl Orchestrator {
    pub fn new(connector: Arc<dyn AccountConnector>, sink: Arc<dyn RecordSink>) -> Self {
        Self {
            connector,
            engine: TraversalEngine::new(sink),
        }
    }

    /// Run `plan` to completion. Any error aborts the whole run.
    #[instrument(skip_all, fields(from = %plan.source_account.redacted(), to = %plan.destination_account.redacted()))]
    pub async fn run(&self, plan: &MigrationPlan) -> Result<TraversalSummary> {
        let source_client = self.connector.connect(&plan.source_account).await?;
        info!(account = %plan.source_account.redacted(), "Source account authenticated");

        let destination_client = self.connector.connect(&plan.destination_account).await?;
        info!(account = %plan.destination_account.redacted(), "Destination account authenticated");

        let source =
            FolderResolver::resolve(source_client, &plan.source_account, &plan.source_folder)
                .await?;
        let destination = FolderResolver::resolve(
            destination_client,
            &plan.destination_account,
            &plan.destination_folder,
        )
        .await?;

        let summary = self.engine.migrate(&source, &destination).await?;

        info!(
            source = %source.name(),
            destination = %destination.name(),
            files = summary.files,
            folders_skipped = summary.folders_skipped,
            permissions = summary.permissions,
            incomplete = summary.incomplete,
            "Folder migrated"
        );

        Ok(summary)
    }
}

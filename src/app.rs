//! Wiring of the desktop bridges into a migration run

use anyhow::{Context, Result};
use bridge_desktop::{ConsolePrompt, FileSecureStore, ReqwestHttpClient, TlsTrust};
use core_auth::{AccountId, Authenticator, OAuthConfig};
use core_migrate::{
    DriveAccountConnector, MigrationPlan, Orchestrator, TracingSink, TraversalSummary,
};
use core_runtime::config::DEFAULT_REQUEST_TIMEOUT;
use core_runtime::logging::{init_logging, LoggingConfig};
use core_runtime::CoreConfig;
use std::sync::Arc;
use tracing::info;

use crate::cli::Args;

/// Logging settings requested on the command line
pub fn logging_config(args: &Args) -> LoggingConfig {
    let mut config = LoggingConfig::default().with_level(args.log_level);
    if let Some(format) = args.log_format {
        config = config.with_format(format);
    }
    if let Some(filter) = &args.log_filter {
        config = config.with_filter(filter.clone());
    }
    config
}

/// Plan described by the command line
pub fn migration_plan(args: &Args) -> Result<MigrationPlan> {
    Ok(MigrationPlan {
        source_account: AccountId::new(args.from.as_str()).context("Invalid source account")?,
        destination_account: AccountId::new(args.to.as_str())
            .context("Invalid destination account")?,
        source_folder: args.from_folder.clone(),
        destination_folder: args.to_folder.clone(),
    })
}

/// Build the bridges for this machine and run the migration
pub async fn run(args: Args) -> Result<TraversalSummary> {
    init_logging(logging_config(&args)).context("Failed to initialize logging")?;

    let plan = migration_plan(&args)?;

    let http_client =
        Arc::new(ReqwestHttpClient::new().context("Failed to create HTTP client")?);
    let mut builder = CoreConfig::builder()
        .http_client(http_client)
        .secure_store(Arc::new(FileSecureStore::new(args.token_dir.clone())))
        .auth_prompt(Arc::new(ConsolePrompt::stdio()))
        .request_timeout(DEFAULT_REQUEST_TIMEOUT);
    if args.insecure_exchange {
        let exchange_client = ReqwestHttpClient::with_options(
            DEFAULT_REQUEST_TIMEOUT,
            TlsTrust::AcceptInvalidCerts,
        )
        .context("Failed to create token exchange client")?;
        builder = builder.exchange_client(Arc::new(exchange_client));
    }
    let config = builder.build().context("Invalid runtime configuration")?;

    let oauth = OAuthConfig::google_drive_from_env()
        .context("Failed to read OAuth client configuration")?;
    let authenticator = Authenticator::new(&config, oauth);
    let orchestrator = Orchestrator::new(
        Arc::new(DriveAccountConnector::new(authenticator)),
        Arc::new(TracingSink),
    );

    info!(
        from = %plan.source_account.redacted(),
        from_folder = %plan.source_folder,
        to = %plan.destination_account.redacted(),
        to_folder = %plan.destination_folder,
        "Starting migration"
    );

    orchestrator.run(&plan).await.with_context(|| {
        format!(
            "Migration of '{}' ({}) to '{}' ({}) failed",
            plan.source_folder,
            plan.source_account,
            plan.destination_folder,
            plan.destination_account
        )
    })
}

use anyhow::Result;
use drive_permission_migrate::{app, Args};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse_normalized();
    let summary = app::run(args).await?;

    tracing::info!(
        files = summary.files,
        permissions = summary.permissions,
        incomplete = summary.incomplete,
        "Done"
    );
    Ok(())
}

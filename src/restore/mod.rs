pub(crate) mod db_restore; // psql against a scoped temporary file
pub(crate) mod s3_download; // fetch + gunzip + UTF-8 decode

use anyhow::{Context, Result};
use tracing::info;

use crate::config::AppConfig;
use crate::storage::ObjectStore;
use crate::utils::process::CommandRunner;

/// Downloads `s3://bucket/key` and applies it to the configured database.
pub async fn run_restore_flow(
    config: &AppConfig,
    runner: &dyn CommandRunner,
    store: &dyn ObjectStore,
) -> Result<()> {
    let target = &config.target;

    info!(target: "restore", "starting restore");
    let sql = s3_download::download_sql(store, config.compressed, &target.bucket, &target.key)
        .await
        .with_context(|| format!("Failed to retrieve dump from s3://{}/{}", target.bucket, target.key))?;

    info!(target: "restore", "running psql");
    db_restore::apply_sql(runner, &config.connection, &sql).context("Failed to apply dump with psql")?;

    info!(target: "restore", "finished restore");
    Ok(())
}

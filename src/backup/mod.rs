pub(crate) mod archive; // gzip of in-memory dumps
pub(crate) mod db_dump; // pg_dump invocation

use anyhow::{Context, Result};
use tracing::info;

use crate::config::AppConfig;
use crate::storage::ObjectStore;
use crate::utils::process::CommandRunner;

/// Dumps the configured database and uploads the payload to `s3://bucket/key`.
pub async fn run_backup_flow(
    config: &AppConfig,
    runner: &dyn CommandRunner,
    store: &dyn ObjectStore,
) -> Result<()> {
    info!(target: "backup", "starting backup");
    let dump = db_dump::dump_database(runner, &config.connection, config.compressed)
        .context("Failed to produce database dump")?;
    info!(target: "backup", "finished backup, size: {} bytes", dump.len());

    let target = &config.target;
    info!(target: "backup", "starting upload to s3://{}/{}", target.bucket, target.key);
    store
        .put_object(&target.bucket, &target.key, dump)
        .await
        .with_context(|| format!("Failed to upload dump to s3://{}/{}", target.bucket, target.key))?;

    info!(target: "backup", "finished upload");
    info!(target: "backup", "finished backup");
    Ok(())
}

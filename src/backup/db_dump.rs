// pg-s3-backup/src/backup/db_dump.rs
use tracing::debug;

use crate::backup::archive::gzip_compress;
use crate::config::ConnectionConfig;
use crate::errors::{AppError, Result};
use crate::utils::PASSWORD_ENV;
use crate::utils::process::{CommandRunner, CommandSpec, StderrTarget};

pub const PG_DUMP: &str = "pg_dump";

/// Builds the pg_dump invocation: UTF-8 output, never prompt, no ownership statements.
pub fn pg_dump_command(connection: &ConnectionConfig) -> CommandSpec {
    let mut spec = CommandSpec::new(PG_DUMP)
        .args(["-E", "utf-8", "-w", "-O"])
        .arg("-h")
        .arg(&connection.host)
        .arg("-U")
        .arg(&connection.user)
        .arg("-p")
        .arg(connection.port.to_string())
        .env(PASSWORD_ENV, &connection.password)
        .capture_stdout()
        .stderr(StderrTarget::ParentStdout);
    if let Some(database) = &connection.database {
        spec = spec.arg(database);
    }
    spec
}

/// Runs pg_dump and returns its stdout, gzip-compressed when `compress` is set.
pub fn dump_database(
    runner: &dyn CommandRunner,
    connection: &ConnectionConfig,
    compress: bool,
) -> Result<Vec<u8>> {
    let output = runner.run(&pg_dump_command(connection))?;
    if !output.success() {
        debug!(target: "backup", "pg_dump diagnostics were sent to {:?}", output.stderr);
        return Err(AppError::DumpFailed { code: output.code });
    }

    if compress {
        gzip_compress(&output.stdout)
    } else {
        Ok(output.stdout)
    }
}

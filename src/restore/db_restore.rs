// pg-s3-backup/src/restore/db_restore.rs
use std::io::Write;
use std::path::Path;
use tempfile::Builder as TempFileBuilder;
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::errors::{AppError, Result};
use crate::utils::PASSWORD_ENV;
use crate::utils::process::{CommandRunner, CommandSpec};

pub const PSQL: &str = "psql";

/// Builds the quiet psql invocation that executes `sql_file_path`.
pub fn psql_command(connection: &ConnectionConfig, sql_file_path: &Path) -> CommandSpec {
    let mut spec = CommandSpec::new(PSQL).arg("-q");
    if let Some(database) = &connection.database {
        spec = spec.arg("-d").arg(database);
    }
    spec.arg("-f")
        .arg(sql_file_path)
        .arg("-h")
        .arg(&connection.host)
        .arg("-U")
        .arg(&connection.user)
        .arg("-p")
        .arg(connection.port.to_string())
        .env(PASSWORD_ENV, &connection.password)
}

/// Writes `sql` to a private temporary file and runs psql against it.
///
/// The file is removed before this returns, whether psql succeeded, exited
/// non-zero, or could not be launched.
pub fn apply_sql(runner: &dyn CommandRunner, connection: &ConnectionConfig, sql: &str) -> Result<()> {
    let mut sql_file = TempFileBuilder::new()
        .prefix("pg-s3-restore-")
        .suffix(".sql")
        .tempfile()?;
    sql_file.write_all(sql.as_bytes())?;
    sql_file.flush()?;

    let run_result = runner.run(&psql_command(connection, sql_file.path()));
    // Deletes the file; on the error paths above the drop guard does the same.
    let close_result = sql_file.close();

    let output = run_result?;
    close_result?;

    if !output.success() {
        debug!(target: "restore", "psql diagnostics were sent to {:?}", output.stderr);
        return Err(AppError::RestoreFailed { code: output.code });
    }
    Ok(())
}

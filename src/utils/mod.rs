pub mod process;

use std::path::PathBuf;
use which::which;

use crate::errors::{AppError, Result};

/// Environment variable libpq tools read the password from.
pub const PASSWORD_ENV: &str = "PGPASSWORD";

/// Finds a PostgreSQL client executable (`pg_dump`, `psql`) in the system PATH.
pub fn find_executable(program: &str) -> Result<PathBuf> {
    which(program).map_err(|source| AppError::ToolNotFound {
        program: program.to_string(),
        source,
    })
}

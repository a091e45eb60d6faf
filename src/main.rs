//! PostgreSQL ⇄ S3 Backup/Restore Tool
//!
//! Dumps a database with `pg_dump` and uploads it to a bucket, or downloads a
//! stored dump and applies it with `psql`.

// pg-s3-backup/src/main.rs
mod backup;
mod config;
mod errors;
mod logging;
mod restore;
mod storage;
mod utils;
#[cfg(test)]
mod testing;

use clap::Parser;
use config::{AppConfig, Cli, Operation};
use std::env;
use std::process::ExitCode;
use storage::{ObjectStore, S3ObjectStore};
use tracing::{error, info};
use utils::process::{CommandRunner, SystemRunner};

const PASSWORD_ENV: &str = "DB_PASSWORD";

/// How a single invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    /// Rejected before any external call.
    Invalid,
    Failed,
}

impl Outcome {
    fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Invalid | Outcome::Failed => ExitCode::FAILURE,
        }
    }
}

/// Main entry point for the backup/restore tool
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(env::var(logging::LOG_LEVEL_ENV).ok().as_deref()) {
        eprintln!("{:?}", e);
        return ExitCode::FAILURE;
    }

    let store = S3ObjectStore::new(cli.s3_endpoint_url.clone());
    run_cli(cli, env::var(PASSWORD_ENV).ok(), &SystemRunner, &store)
        .await
        .exit_code()
}

/// Validates the arguments and runs exactly one operation.
async fn run_cli(
    cli: Cli,
    env_password: Option<String>,
    runner: &dyn CommandRunner,
    store: &dyn ObjectStore,
) -> Outcome {
    let app_config = match AppConfig::resolve(cli, env_password) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return Outcome::Invalid;
        }
    };

    info!(target: "main", "starting operation");
    match run_operation(&app_config, runner, store).await {
        Ok(()) => {
            info!(target: "main", "finished with success");
            Outcome::Success
        }
        Err(e) => {
            error!(target: "main", "stopped: {:?}", e);
            Outcome::Failed
        }
    }
}

async fn run_operation(
    app_config: &AppConfig,
    runner: &dyn CommandRunner,
    store: &dyn ObjectStore,
) -> anyhow::Result<()> {
    match app_config.operation {
        Operation::Backup => backup::run_backup_flow(app_config, runner, store).await,
        Operation::Restore => restore::run_restore_flow(app_config, runner, store).await,
    }
}

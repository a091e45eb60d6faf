// pg-s3-backup/src/config/mod.rs
use chrono::{DateTime, Local};
use clap::{ArgGroup, Parser};
use std::fmt;

use crate::errors::{AppError, Result};

pub const MISSING_PASSWORD_MESSAGE: &str =
    "missing connection password, use --password or the DB_PASSWORD environment variable";
pub const PREFIX_WITH_RESTORE_MESSAGE: &str = "cannot use --restore and --s3-prefix";

const KEY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Command-line surface of the tool.
#[derive(Debug, Parser)]
#[command(name = "pg-s3-backup")]
#[command(version)]
#[command(about = "Backup or restore a postgres database to s3")]
#[command(group(ArgGroup::new("operation").required(true).args(["backup", "restore"])))]
#[command(group(ArgGroup::new("object_key").required(true).args(["s3_key", "s3_prefix"])))]
pub struct Cli {
    #[arg(short, long, help = "dump the database and upload it to s3")]
    pub backup: bool,

    #[arg(short, long, help = "download a dump from s3 and apply it to the database")]
    pub restore: bool,

    #[arg(long, help = "full s3 object key path for the dump")]
    pub s3_key: Option<String>,

    #[arg(
        long,
        help = "s3 object key prefix for the dump. key will be obtained by the date and time"
    )]
    pub s3_prefix: Option<String>,

    #[arg(long, help = "use compressed dump (.gz)")]
    pub compressed: bool,

    #[arg(long, help = "output bucket for the dump")]
    pub s3_bucket: String,

    #[arg(
        long,
        env = "S3_ENDPOINT_URL",
        help = "custom endpoint for s3-compatible storage (DigitalOcean Spaces, MinIO, ...)"
    )]
    pub s3_endpoint_url: Option<String>,

    #[arg(long, help = "host to connect to")]
    pub host: String,

    #[arg(long, help = "database name")]
    pub database: Option<String>,

    #[arg(long, default_value_t = 5432, help = "port to connect to")]
    pub port: u16,

    #[arg(long, help = "user name to use for the operation")]
    pub user: String,

    #[arg(
        long,
        help = "password for the database, please prefer using the DB_PASSWORD environment variable over this switch"
    )]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Backup,
    Restore,
}

/// Everything needed to reach the database through the PostgreSQL client tools.
#[derive(Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<String>,
    pub user: String,
    pub password: String,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageTarget {
    pub bucket: String,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub operation: Operation,
    pub compressed: bool,
    pub target: StorageTarget,
    pub connection: ConnectionConfig,
}

impl AppConfig {
    /// Validates parsed arguments and resolves the password and object key.
    ///
    /// `env_password` is the value of `DB_PASSWORD`; an empty value counts as absent.
    pub fn resolve(cli: Cli, env_password: Option<String>) -> Result<Self> {
        Self::resolve_at(cli, env_password, Local::now())
    }

    fn resolve_at(cli: Cli, env_password: Option<String>, now: DateTime<Local>) -> Result<Self> {
        let password = resolve_password(env_password, cli.password)
            .ok_or_else(|| AppError::Validation(MISSING_PASSWORD_MESSAGE.to_string()))?;

        let operation = if cli.restore {
            Operation::Restore
        } else {
            Operation::Backup
        };

        let key = match (cli.s3_key, cli.s3_prefix) {
            (_, Some(_)) if operation == Operation::Restore => {
                return Err(AppError::Validation(PREFIX_WITH_RESTORE_MESSAGE.to_string()));
            }
            (_, Some(prefix)) => derive_object_key(&prefix, cli.compressed, now),
            (Some(key), None) => key,
            // clap enforces the object_key group
            (None, None) => {
                return Err(AppError::Validation(
                    "one of --s3-key or --s3-prefix is required".to_string(),
                ));
            }
        };

        Ok(AppConfig {
            operation,
            compressed: cli.compressed,
            target: StorageTarget {
                bucket: cli.s3_bucket,
                key,
            },
            connection: ConnectionConfig {
                host: cli.host,
                port: cli.port,
                database: cli.database,
                user: cli.user,
                password,
            },
        })
    }
}

fn resolve_password(env_password: Option<String>, flag_password: Option<String>) -> Option<String> {
    env_password.filter(|p| !p.is_empty()).or(flag_password)
}

/// Builds `<prefix><YYYY-MM-DD_HH-MM-SS><.sql|.sql.gz>`.
pub fn derive_object_key(prefix: &str, compressed: bool, now: DateTime<Local>) -> String {
    let extension = if compressed { ".sql.gz" } else { ".sql" };
    format!("{}{}{}", prefix, now.format(KEY_TIMESTAMP_FORMAT), extension)
}

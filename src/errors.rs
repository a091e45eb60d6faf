use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid flag combination or missing credentials, detected before any external call.
    #[error("{0}")]
    Validation(String),

    #[error("Executable not found in PATH: {program}")]
    ToolNotFound {
        program: String,
        #[source]
        source: which::Error,
    },

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Dump failed: pg_dump exited with {}", exit_label(.code))]
    DumpFailed { code: Option<i32> },

    #[error("Restore failed: psql exited with {}", exit_label(.code))]
    RestoreFailed { code: Option<i32> },

    #[error("Upload to s3://{bucket}/{key} failed: {message}")]
    Upload {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("Retrieval of s3://{bucket}/{key} failed: {message}")]
    Retrieval {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

//! Test doubles shared by the unit tests.

use std::io;
use std::sync::{Arc, Mutex};

use tracing::level_filters::LevelFilter;
use tracing::subscriber::DefaultGuard;

use crate::config::{AppConfig, ConnectionConfig, Operation, StorageTarget};
use crate::errors::{AppError, Result};
use crate::logging::LineFormat;
use crate::utils::process::{CommandRunner, CommandSpec, ProcessOutput};

pub fn connection(database: Option<&str>) -> ConnectionConfig {
    ConnectionConfig {
        host: "db.local".to_string(),
        port: 5432,
        database: database.map(str::to_string),
        user: "app".to_string(),
        password: "secret".to_string(),
    }
}

pub fn app_config(operation: Operation, compressed: bool, key: &str) -> AppConfig {
    AppConfig {
        operation,
        compressed,
        target: StorageTarget {
            bucket: "dumps".to_string(),
            key: key.to_string(),
        },
        connection: connection(Some("shop")),
    }
}

/// What a [`RecordingRunner`] saw when a tool was invoked.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub spec: CommandSpec,
    /// The `-f` argument, if any.
    pub file_path: Option<String>,
    /// Contents of the `-f` file at the moment of the call.
    pub file_contents: Option<String>,
}

enum Behaviour {
    Exit { code: i32, stdout: Vec<u8> },
    SpawnError,
}

/// Stands in for pg_dump/psql: records each call and returns a canned result.
pub struct RecordingRunner {
    behaviour: Behaviour,
    invocations: Mutex<Vec<Invocation>>,
}

impl RecordingRunner {
    fn new(behaviour: Behaviour) -> Self {
        RecordingRunner {
            behaviour,
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding_with(stdout: &[u8]) -> Self {
        Self::new(Behaviour::Exit {
            code: 0,
            stdout: stdout.to_vec(),
        })
    }

    pub fn exiting_with(code: i32) -> Self {
        Self::new(Behaviour::Exit {
            code,
            stdout: Vec::new(),
        })
    }

    pub fn failing_to_spawn() -> Self {
        Self::new(Behaviour::SpawnError)
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn programs(&self) -> Vec<String> {
        self.invocations()
            .into_iter()
            .map(|invocation| invocation.spec.program)
            .collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput> {
        let file_path = spec
            .args
            .iter()
            .position(|arg| arg == "-f")
            .and_then(|i| spec.args.get(i + 1))
            .map(|path| path.to_string_lossy().into_owned());
        let file_contents = file_path
            .as_ref()
            .and_then(|path| std::fs::read_to_string(path).ok());

        self.invocations.lock().unwrap().push(Invocation {
            spec: spec.clone(),
            file_path,
            file_contents,
        });

        match &self.behaviour {
            Behaviour::Exit { code, stdout } => Ok(ProcessOutput {
                code: Some(*code),
                stdout: if spec.capture_stdout {
                    stdout.clone()
                } else {
                    Vec::new()
                },
                stderr: spec.stderr,
            }),
            Behaviour::SpawnError => Err(AppError::Spawn {
                program: spec.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "not executable"),
            }),
        }
    }
}

/// In-memory log sink shared with the subscriber.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Routes this thread's events through the production line format into a buffer
/// until the guard is dropped.
pub fn capture_logs() -> (LogBuffer, DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .with_writer(move || writer.clone())
        .event_format(LineFormat)
        .finish();
    (buffer, tracing::subscriber::set_default(subscriber))
}

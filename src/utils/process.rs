// pg-s3-backup/src/utils/process.rs
use std::ffi::OsString;
use std::fmt;
use std::io;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::errors::{AppError, Result};
use crate::utils::find_executable;

/// Where the child's diagnostic stream goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StderrTarget {
    /// Shares the parent's stderr.
    Inherit,
    /// Streamed into the parent's stdout.
    ParentStdout,
}

/// A single invocation of an external tool.
#[derive(Clone)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<OsString>,
    pub envs: Vec<(String, String)>,
    pub capture_stdout: bool,
    pub stderr: StderrTarget,
}

impl CommandSpec {
    pub fn new(program: &str) -> Self {
        CommandSpec {
            program: program.to_string(),
            args: Vec::new(),
            envs: Vec::new(),
            capture_stdout: false,
            stderr: StderrTarget::Inherit,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn capture_stdout(mut self) -> Self {
        self.capture_stdout = true;
        self
    }

    pub fn stderr(mut self, target: StderrTarget) -> Self {
        self.stderr = target;
        self
    }

    #[cfg(test)]
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.envs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

// Environment values carry the database password.
impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let env_keys: Vec<&str> = self.envs.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("CommandSpec")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("env_keys", &env_keys)
            .field("capture_stdout", &self.capture_stdout)
            .field("stderr", &self.stderr)
            .finish()
    }
}

/// Result of running an external tool to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the child was terminated by a signal.
    pub code: Option<i32>,
    /// Empty unless `capture_stdout` was set.
    pub stdout: Vec<u8>,
    pub stderr: StderrTarget,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external tools. A failure to launch is an error; a non-zero exit is not.
pub trait CommandRunner: Send + Sync {
    fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput>;
}

/// Spawns real processes, resolving programs on PATH.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput> {
        let program_path = find_executable(&spec.program)?;
        debug!(target: "main", "running {} ({:?})", program_path.display(), spec.args);

        let stdout = if spec.capture_stdout {
            Stdio::piped()
        } else {
            Stdio::inherit()
        };
        let stderr = match spec.stderr {
            StderrTarget::Inherit => Stdio::inherit(),
            StderrTarget::ParentStdout => Stdio::from(io::stdout()),
        };

        let output = Command::new(&program_path)
            .args(&spec.args)
            .envs(spec.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdout(stdout)
            .stderr(stderr)
            .output()
            .map_err(|source| AppError::Spawn {
                program: spec.program.clone(),
                source,
            })?;

        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: spec.stderr,
        })
    }
}

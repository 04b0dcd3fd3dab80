use async_trait::async_trait;
use std::fmt;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::config::OutputMode;
use crate::error::{Result, ScanError};

/// A fully built external command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Wrap the command with an elevation prefix such as `sudo`.
    pub fn elevated(self, elevation: &str) -> Self {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(self.program);
        args.extend(self.args);
        Self {
            program: elevation.to_string(),
            args,
        }
    }

    /// Value following `flag`, e.g. the path after `-o`.
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Exit information for a finished subprocess. Output fields are only
/// populated in [`OutputMode::Capture`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// Turn a non-zero exit into [`ScanError::ToolFailed`].
    pub fn check(self, tool: &str) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(ScanError::ToolFailed {
                tool: tool.to_string(),
                code: self.code,
                stderr: self.stderr,
            })
        }
    }
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run to completion. Only launch failures are errors; a non-zero exit
    /// comes back as an unsuccessful [`ProcessOutput`].
    async fn run(&self, invocation: &Invocation, mode: OutputMode) -> Result<ProcessOutput>;
}

/// Spawns real processes and waits for them.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation, mode: OutputMode) -> Result<ProcessOutput> {
        debug!("exec: {}", invocation);

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args).stdin(Stdio::inherit());

        let launch_error = |source: std::io::Error| ScanError::Launch {
            tool: invocation.program.clone(),
            source,
        };

        let stdout = match mode {
            OutputMode::Stream => Stdio::inherit(),
            OutputMode::StreamToStderr => Stdio::from(std::io::stderr()),
            OutputMode::Capture => {
                let output = command.output().await.map_err(launch_error)?;
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                if !stderr.trim().is_empty() {
                    debug!("{} stderr:\n{}", invocation.program, stderr.trim_end());
                }
                return Ok(ProcessOutput {
                    code: output.status.code(),
                    success: output.status.success(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr,
                });
            }
        };

        let status = command
            .stdout(stdout)
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(launch_error)?;
        Ok(ProcessOutput {
            code: status.code(),
            success: status.success(),
            ..Default::default()
        })
    }
}

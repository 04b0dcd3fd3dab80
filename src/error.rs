use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("no target specified")]
    MissingTarget,

    #[error("invalid target '{0}': targets may not start with '-'")]
    InvalidTarget(String),

    #[error("root privileges required for a full scan, run with sudo or pass --sudo false")]
    PrivilegeRequired,

    #[error("timing level {0} out of range (expected 0-5)")]
    InvalidTiming(u8),

    #[error("failed to launch {tool}: {source}")]
    Launch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {}{}", describe_exit(.code), describe_stderr(.stderr))]
    ToolFailed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("could not clear stale discovery output {}: {source}", .path.display())]
    ArtifactClear {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read discovery output {}: {source}", .path.display())]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

fn describe_stderr(stderr: &str) -> String {
    match stderr.trim() {
        "" => String::new(),
        text => format!(": {}", text),
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

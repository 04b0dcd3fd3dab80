use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::cli::{Cli, SummaryFormat};
use crate::error::ScanError;

/// nmap `-T` template, 0 (paranoid) through 5 (insane).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimingLevel(u8);

impl TimingLevel {
    pub const MAX: u8 = 5;

    pub fn new(level: u8) -> Result<Self, ScanError> {
        if level > Self::MAX {
            return Err(ScanError::InvalidTiming(level));
        }
        Ok(Self(level))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    pub fn as_flag(self) -> String {
        format!("-T{}", self.0)
    }
}

impl Default for TimingLevel {
    fn default() -> Self {
        Self(Self::MAX)
    }
}

impl TryFrom<u8> for TimingLevel {
    type Error = ScanError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl fmt::Display for TimingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// How subprocess stdout/stderr are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Inherit the terminal so the operator sees tool progress live.
    Stream,
    /// Live output, but the child's stdout is sent to our stderr so our own
    /// stdout carries nothing but the report.
    StreamToStderr,
    /// Pipe and collect output; used for headless runs and tests.
    Capture,
}

/// External executables the pipeline drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub discovery: String,
    pub deep_scan: String,
    pub elevation: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            discovery: "naabu".to_string(),
            deep_scan: "nmap".to_string(),
            elevation: "sudo".to_string(),
        }
    }
}

/// Settings for one orchestration run. Built once at startup, read-only after.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub target: String,
    pub min_rate: u32,
    pub use_sudo: bool,
    pub timing: TimingLevel,
    pub artifact_path: PathBuf,
    pub output_mode: OutputMode,
    pub tools: ToolPaths,
    pub fail_on_deep_scan_error: bool,
}

impl ScanConfig {
    pub const DEFAULT_MIN_RATE: u32 = 5000;
    pub const DEFAULT_ARTIFACT: &'static str = "open_ports.txt";

    /// Defaults for everything but the target.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            min_rate: Self::DEFAULT_MIN_RATE,
            use_sudo: true,
            timing: TimingLevel::default(),
            artifact_path: PathBuf::from(Self::DEFAULT_ARTIFACT),
            output_mode: OutputMode::Stream,
            tools: ToolPaths::default(),
            fail_on_deep_scan_error: false,
        }
    }

    pub fn from_cli(cli: &Cli) -> Result<Self, ScanError> {
        Ok(Self {
            target: cli.resolved_target(),
            min_rate: cli.min_rate,
            use_sudo: cli.sudo,
            timing: TimingLevel::new(cli.timing)?,
            artifact_path: cli.artifact.clone(),
            output_mode: match (cli.capture, cli.format) {
                (true, _) => OutputMode::Capture,
                (false, SummaryFormat::Json) => OutputMode::StreamToStderr,
                (false, SummaryFormat::Human) => OutputMode::Stream,
            },
            tools: ToolPaths {
                discovery: cli.discovery_tool.clone(),
                deep_scan: cli.deep_scan_tool.clone(),
                elevation: cli.elevate_with.clone(),
            },
            fail_on_deep_scan_error: cli.fail_on_deep_scan_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_timing_level_bounds() {
        assert_eq!(TimingLevel::new(0).unwrap().level(), 0);
        assert_eq!(TimingLevel::try_from(5).unwrap().as_flag(), "-T5");
        assert!(matches!(TimingLevel::new(6), Err(ScanError::InvalidTiming(6))));
    }

    #[test]
    fn test_timing_display() {
        assert_eq!(TimingLevel::new(4).unwrap().to_string(), "T4");
    }

    #[test]
    fn test_from_cli() {
        let cli = Cli::parse_from([
            "sweepchain",
            "--target",
            "10.0.0.5",
            "--min-rate",
            "1000",
            "--sudo",
            "false",
            "-T",
            "3",
            "--capture",
            "--artifact",
            "/tmp/naabu.json",
        ]);
        let config = ScanConfig::from_cli(&cli).unwrap();
        assert_eq!(config.target, "10.0.0.5");
        assert_eq!(config.min_rate, 1000);
        assert!(!config.use_sudo);
        assert_eq!(config.timing.level(), 3);
        assert_eq!(config.output_mode, OutputMode::Capture);
        assert_eq!(config.artifact_path, PathBuf::from("/tmp/naabu.json"));
        assert_eq!(config.tools, ToolPaths::default());
    }

    #[test]
    fn test_json_summary_keeps_tool_output_off_stdout() {
        let cli = Cli::parse_from(["sweepchain", "--format", "json", "10.0.0.5"]);
        assert_eq!(ScanConfig::from_cli(&cli).unwrap().output_mode, OutputMode::StreamToStderr);

        let cli = Cli::parse_from(["sweepchain", "--format", "json", "--capture", "10.0.0.5"]);
        assert_eq!(ScanConfig::from_cli(&cli).unwrap().output_mode, OutputMode::Capture);

        let cli = Cli::parse_from(["sweepchain", "10.0.0.5"]);
        assert_eq!(ScanConfig::from_cli(&cli).unwrap().output_mode, OutputMode::Stream);
    }

    #[test]
    fn test_new_defaults() {
        let config = ScanConfig::new("example.com");
        assert_eq!(config.min_rate, 5000);
        assert!(config.use_sudo);
        assert_eq!(config.timing.level(), 5);
        assert_eq!(config.output_mode, OutputMode::Stream);
        assert!(!config.fail_on_deep_scan_error);
    }
}

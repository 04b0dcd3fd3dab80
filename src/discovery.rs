use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::{OutputMode, ScanConfig};
use crate::error::{Result, ScanError};
use crate::extractor::extract_ports;
use crate::process::{Invocation, ProcessRunner};
use crate::results::DiscoveryOutcome;

/// Runs naabu over the full port range and reads back its JSON lines.
pub struct DiscoveryRunner<'a> {
    tool: &'a str,
    elevation: Option<&'a str>,
    artifact: &'a Path,
    min_rate: u32,
    mode: OutputMode,
}

impl<'a> DiscoveryRunner<'a> {
    pub fn new(config: &'a ScanConfig) -> Self {
        Self {
            tool: &config.tools.discovery,
            elevation: config.use_sudo.then_some(config.tools.elevation.as_str()),
            artifact: &config.artifact_path,
            min_rate: config.min_rate,
            mode: config.output_mode,
        }
    }

    pub fn invocation(&self, target: &str) -> Invocation {
        let args = vec![
            "-host".to_string(),
            target.to_string(),
            "-p".to_string(),
            "-".to_string(),
            "-json".to_string(),
            "--rate".to_string(),
            self.min_rate.to_string(),
            "-o".to_string(),
            self.artifact.display().to_string(),
        ];

        let invocation = Invocation::new(self.tool, args);
        match self.elevation {
            Some(prefix) => invocation.elevated(prefix),
            None => invocation,
        }
    }

    /// Never fails: launch errors, a bad exit, or an unreadable artifact all
    /// degrade to an outcome with no ports so the deep scan can fall back.
    pub async fn run(&self, runner: &dyn ProcessRunner, target: &str) -> DiscoveryOutcome {
        match self.discover(runner, target).await {
            Ok(ports) if ports.is_empty() => {
                warn!("{} reported no open ports on {}, falling back to a full range scan", self.tool, target);
                DiscoveryOutcome::NoPorts
            }
            Ok(ports) => DiscoveryOutcome::Found { ports },
            Err(e) => {
                warn!("discovery failed: {}", e);
                DiscoveryOutcome::Failed { reason: e.to_string() }
            }
        }
    }

    async fn discover(&self, runner: &dyn ProcessRunner, target: &str) -> Result<Vec<u16>> {
        let invocation = self.invocation(target);
        debug!("starting {} sweep against {}", self.tool, target);
        debug!("{}", invocation);

        // A stale file from an earlier run must not be mistaken for fresh results.
        match tokio::fs::remove_file(self.artifact).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                return Err(ScanError::ArtifactClear {
                    path: PathBuf::from(self.artifact),
                    source: e,
                });
            }
            _ => {}
        }

        let output = runner.run(&invocation, self.mode).await?.check(self.tool)?;
        if !output.stdout.is_empty() {
            debug!("{} output:\n{}", self.tool, output.stdout);
        }

        let raw = tokio::fs::read_to_string(self.artifact)
            .await
            .map_err(|source| ScanError::ArtifactRead {
                path: PathBuf::from(self.artifact),
                source,
            })?;

        Ok(extract_ports(&raw))
    }
}

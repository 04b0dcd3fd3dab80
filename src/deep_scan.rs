use tracing::{debug, error};

use crate::config::{OutputMode, ScanConfig, TimingLevel};
use crate::extractor::join_ports;
use crate::process::{Invocation, ProcessRunner};
use crate::results::{DeepScanOutcome, PortScope};

/// Runs nmap with `-A`, restricted to discovered ports when there are any.
pub struct DeepScanRunner<'a> {
    tool: &'a str,
    elevation: Option<&'a str>,
    timing: TimingLevel,
    mode: OutputMode,
}

impl<'a> DeepScanRunner<'a> {
    pub fn new(config: &'a ScanConfig) -> Self {
        Self {
            tool: &config.tools.deep_scan,
            elevation: config.use_sudo.then_some(config.tools.elevation.as_str()),
            timing: config.timing,
            mode: config.output_mode,
        }
    }

    pub fn invocation(&self, target: &str, ports: &[u16]) -> Invocation {
        let mut args = vec!["-A".to_string(), self.timing.as_flag()];
        if ports.is_empty() {
            args.push("-p-".to_string());
        } else {
            args.push("-p".to_string());
            args.push(join_ports(ports, ","));
        }
        args.push(target.to_string());

        let invocation = Invocation::new(self.tool, args);
        match self.elevation {
            Some(prefix) => invocation.elevated(prefix),
            None => invocation,
        }
    }

    /// Last stage of the pipeline, so a failure is reported and returned as-is.
    pub async fn run(&self, runner: &dyn ProcessRunner, target: &str, ports: &[u16]) -> DeepScanOutcome {
        let scope = if ports.is_empty() {
            PortScope::FullRange
        } else {
            PortScope::Restricted
        };

        let invocation = self.invocation(target, ports);
        debug!("deep scan of {} ({:?}, {})", target, scope, self.timing);
        debug!("{}", invocation);

        let result = runner
            .run(&invocation, self.mode)
            .await
            .and_then(|output| output.check(self.tool));

        match result {
            Ok(output) if self.mode == OutputMode::Capture => DeepScanOutcome::Completed {
                scope,
                output: Some(output.stdout),
                stderr: Some(output.stderr).filter(|e| !e.trim().is_empty()),
            },
            Ok(_) => DeepScanOutcome::Completed {
                scope,
                output: None,
                stderr: None,
            },
            Err(e) => {
                error!("{} scan failed: {}", self.tool, e);
                DeepScanOutcome::Failed { scope, reason: e.to_string() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, ScanError};
    use crate::process::ProcessOutput;
    use async_trait::async_trait;

    fn config(sudo: bool) -> ScanConfig {
        let mut config = ScanConfig::new("10.0.0.5");
        config.use_sudo = sudo;
        config.timing = TimingLevel::new(4).unwrap();
        config.output_mode = OutputMode::Capture;
        config
    }

    #[test]
    fn test_restricted_invocation() {
        let config = config(false);
        let inv = DeepScanRunner::new(&config).invocation("10.0.0.5", &[22, 80]);
        assert_eq!(inv.program, "nmap");
        assert_eq!(inv.args, vec!["-A", "-T4", "-p", "22,80", "10.0.0.5"]);
        assert_eq!(inv.value_of("-p"), Some("22,80"));
        assert!(!inv.has_arg("-p-"));
    }

    #[test]
    fn test_full_range_fallback() {
        let config = config(false);
        let inv = DeepScanRunner::new(&config).invocation("10.0.0.5", &[]);
        assert_eq!(inv.args, vec!["-A", "-T4", "-p-", "10.0.0.5"]);
        assert!(!inv.has_arg("-p"));
        assert_eq!(inv.args.iter().filter(|a| *a == "10.0.0.5").count(), 1);
    }

    #[test]
    fn test_privileged_invocation() {
        let config = config(true);
        let inv = DeepScanRunner::new(&config).invocation("10.0.0.5", &[443]);
        assert_eq!(inv.program, "sudo");
        assert_eq!(inv.args[0], "nmap");
        assert_eq!(inv.value_of("-p"), Some("443"));
    }

    struct Fails;

    #[async_trait]
    impl ProcessRunner for Fails {
        async fn run(&self, invocation: &Invocation, _mode: OutputMode) -> Result<ProcessOutput> {
            Err(ScanError::Launch {
                tool: invocation.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            })
        }
    }

    struct Prints;

    #[async_trait]
    impl ProcessRunner for Prints {
        async fn run(&self, _invocation: &Invocation, _mode: OutputMode) -> Result<ProcessOutput> {
            Ok(ProcessOutput {
                code: Some(0),
                success: true,
                stdout: "22/tcp open ssh OpenSSH 9.6".to_string(),
                stderr: "Warning: OSScan results may be unreliable".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_launch_failure_reported() {
        let config = config(false);
        let outcome = DeepScanRunner::new(&config).run(&Fails, "10.0.0.5", &[]).await;
        assert!(outcome.is_failure());
        assert_eq!(outcome.scope(), PortScope::FullRange);
    }

    #[tokio::test]
    async fn test_captured_output_kept() {
        let config = config(false);
        let outcome = DeepScanRunner::new(&config).run(&Prints, "10.0.0.5", &[22]).await;
        assert_eq!(
            outcome,
            DeepScanOutcome::Completed {
                scope: PortScope::Restricted,
                output: Some("22/tcp open ssh OpenSSH 9.6".to_string()),
                stderr: Some("Warning: OSScan results may be unreliable".to_string()),
            }
        );
    }

    struct ComplainsAndFails;

    #[async_trait]
    impl ProcessRunner for ComplainsAndFails {
        async fn run(&self, _invocation: &Invocation, _mode: OutputMode) -> Result<ProcessOutput> {
            Ok(ProcessOutput {
                code: Some(1),
                success: false,
                stdout: String::new(),
                stderr: "Failed to resolve \"10.0.0.5\".\n".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_failure_reason_includes_stderr() {
        let config = config(false);
        let outcome = DeepScanRunner::new(&config).run(&ComplainsAndFails, "10.0.0.5", &[80]).await;
        match outcome {
            DeepScanOutcome::Failed { scope, reason } => {
                assert_eq!(scope, PortScope::Restricted);
                assert_eq!(reason, "nmap exited with status 1: Failed to resolve \"10.0.0.5\".");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}

use chrono::Utc;
use tracing::{error, info};

use crate::config::ScanConfig;
use crate::deep_scan::DeepScanRunner;
use crate::discovery::DiscoveryRunner;
use crate::error::ScanError;
use crate::output::Console;
use crate::privilege::PrivilegeProbe;
use crate::process::ProcessRunner;
use crate::results::{AbortReason, DeepScanOutcome, DiscoveryOutcome, ScanReport, ScanState};

pub const EXIT_OK: i32 = 0;
pub const EXIT_ABORTED: i32 = 1;
pub const EXIT_DEEP_SCAN_FAILED: i32 = 2;

/// Drives one discovery + deep scan run:
/// `Validating -> Discovering -> DeepScanning -> Complete`, or
/// `Validating -> Aborted` when a precondition fails.
pub struct Orchestrator<'a> {
    config: &'a ScanConfig,
    runner: &'a dyn ProcessRunner,
    privilege: &'a dyn PrivilegeProbe,
    console: &'a Console,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a ScanConfig,
        runner: &'a dyn ProcessRunner,
        privilege: &'a dyn PrivilegeProbe,
        console: &'a Console,
    ) -> Self {
        Self {
            config,
            runner,
            privilege,
            console,
        }
    }

    /// Check the target and privilege preconditions without launching anything.
    pub fn validate(&self) -> Result<&str, ScanError> {
        let target = self.config.target.trim();
        if target.is_empty() {
            return Err(ScanError::MissingTarget);
        }
        if target.starts_with('-') {
            return Err(ScanError::InvalidTarget(target.to_string()));
        }
        if self.config.use_sudo && !self.privilege.is_elevated() {
            return Err(ScanError::PrivilegeRequired);
        }
        Ok(target)
    }

    pub async fn run(&self) -> ScanReport {
        let start_time = Utc::now();
        let mut run = Run::new();

        let target = match self.validate() {
            Ok(target) => target,
            Err(e) => {
                error!("{}", e);
                run.enter(ScanState::Aborted(abort_reason(&e)));
                return self.report(run, start_time, None, None);
            }
        };

        self.console.banner(target);

        run.enter(ScanState::Discovering);
        let discovery_runner = DiscoveryRunner::new(self.config);
        self.console.discovery_started(&self.config.tools.discovery);
        let discovery = discovery_runner.run(self.runner, target).await;
        self.console.discovery_finished(&self.config.tools.discovery, &discovery);

        run.enter(ScanState::DeepScanning);
        let deep_runner = DeepScanRunner::new(self.config);
        self.console.deep_scan_started(&self.config.tools.deep_scan, discovery.ports());
        let deep_scan = deep_runner.run(self.runner, target, discovery.ports()).await;

        run.enter(ScanState::Complete);
        self.console.complete();

        self.report(run, start_time, Some(discovery), Some(deep_scan))
    }

    fn report(
        &self,
        run: Run,
        start_time: chrono::DateTime<Utc>,
        discovery: Option<DiscoveryOutcome>,
        deep_scan: Option<DeepScanOutcome>,
    ) -> ScanReport {
        let exit_code = match run.state {
            ScanState::Aborted(_) => EXIT_ABORTED,
            _ if self.config.fail_on_deep_scan_error
                && deep_scan.as_ref().is_some_and(DeepScanOutcome::is_failure) =>
            {
                EXIT_DEEP_SCAN_FAILED
            }
            _ => EXIT_OK,
        };

        ScanReport {
            target: self.config.target.trim().to_string(),
            timing: self.config.timing,
            start_time,
            end_time: Utc::now(),
            history: run.history,
            state: run.state,
            discovery,
            deep_scan,
            exit_code,
        }
    }
}

fn abort_reason(err: &ScanError) -> AbortReason {
    match err {
        ScanError::InvalidTarget(_) => AbortReason::InvalidTarget,
        ScanError::PrivilegeRequired => AbortReason::InsufficientPrivilege,
        _ => AbortReason::MissingTarget,
    }
}

struct Run {
    state: ScanState,
    history: Vec<ScanState>,
}

impl Run {
    fn new() -> Self {
        Self {
            state: ScanState::Validating,
            history: vec![ScanState::Validating],
        }
    }

    fn enter(&mut self, next: ScanState) {
        info!("{} -> {}", self.state, next);
        self.state = next;
        self.history.push(next);
    }
}

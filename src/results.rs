use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::config::TimingLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    MissingTarget,
    InvalidTarget,
    InsufficientPrivilege,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::MissingTarget => write!(f, "missing target"),
            AbortReason::InvalidTarget => write!(f, "invalid target"),
            AbortReason::InsufficientPrivilege => write!(f, "insufficient privilege"),
        }
    }
}

/// Orchestrator lifecycle. `Aborted` is only reachable from `Validating`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum ScanState {
    Validating,
    Discovering,
    DeepScanning,
    Complete,
    Aborted(AbortReason),
}

impl ScanState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanState::Complete | ScanState::Aborted(_))
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanState::Validating => write!(f, "validating"),
            ScanState::Discovering => write!(f, "discovering"),
            ScanState::DeepScanning => write!(f, "deep-scanning"),
            ScanState::Complete => write!(f, "complete"),
            ScanState::Aborted(reason) => write!(f, "aborted ({})", reason),
        }
    }
}

/// What the discovery pass handed to the deep scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DiscoveryOutcome {
    Found { ports: Vec<u16> },
    NoPorts,
    Failed { reason: String },
}

impl DiscoveryOutcome {
    pub fn ports(&self) -> &[u16] {
        match self {
            DiscoveryOutcome::Found { ports } => ports,
            DiscoveryOutcome::NoPorts | DiscoveryOutcome::Failed { .. } => &[],
        }
    }

    pub fn from_ports(ports: Vec<u16>) -> Self {
        if ports.is_empty() {
            DiscoveryOutcome::NoPorts
        } else {
            DiscoveryOutcome::Found { ports }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PortScope {
    /// `-p` restricted to discovered ports.
    Restricted,
    /// `-p-`, every port.
    FullRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeepScanOutcome {
    Completed {
        scope: PortScope,
        #[serde(skip_serializing_if = "Option::is_none")]
        output: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        stderr: Option<String>,
    },
    Failed {
        scope: PortScope,
        reason: String,
    },
}

impl DeepScanOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, DeepScanOutcome::Failed { .. })
    }

    pub fn scope(&self) -> PortScope {
        match self {
            DeepScanOutcome::Completed { scope, .. } | DeepScanOutcome::Failed { scope, .. } => *scope,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub target: String,
    pub timing: TimingLevel,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub history: Vec<ScanState>,
    pub state: ScanState,
    pub discovery: Option<DiscoveryOutcome>,
    pub deep_scan: Option<DeepScanOutcome>,
    pub exit_code: i32,
}

impl ScanReport {
    pub fn completed(&self) -> bool {
        self.state == ScanState::Complete
    }

    /// Ports the deep scan was restricted to; empty means full range or no scan.
    pub fn ports(&self) -> &[u16] {
        self.discovery.as_ref().map(DiscoveryOutcome::ports).unwrap_or(&[])
    }
}

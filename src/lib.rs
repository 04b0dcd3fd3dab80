pub mod cli;
pub mod config;
pub mod deep_scan;
pub mod discovery;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod orchestrator;
pub mod output;
pub mod privilege;
pub mod process;
pub mod results;

pub use config::{OutputMode, ScanConfig, TimingLevel};
pub use error::ScanError;
pub use orchestrator::Orchestrator;
pub use results::{DeepScanOutcome, DiscoveryOutcome, ScanReport, ScanState};

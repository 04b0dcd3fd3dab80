use anyhow::Result;
use colored::*;
use std::io::{self, Write};

use crate::cli::SummaryFormat;
use crate::extractor::join_ports;
use crate::results::{DeepScanOutcome, DiscoveryOutcome, PortScope, ScanReport, ScanState};

/// Operator-facing status lines and the end-of-run summary.
pub struct Console {
    format: SummaryFormat,
    banner: bool,
    silent: bool,
}

impl Console {
    pub fn new(format: SummaryFormat, banner: bool) -> Self {
        Self {
            format,
            banner,
            silent: false,
        }
    }

    /// Prints nothing at all.
    pub fn silent() -> Self {
        Self {
            format: SummaryFormat::Human,
            banner: false,
            silent: true,
        }
    }

    // Progress lines go to stderr in JSON mode so stdout stays parseable.
    fn line(&self, text: impl std::fmt::Display) {
        if self.silent {
            return;
        }
        match self.format {
            SummaryFormat::Human => println!("{}", text),
            SummaryFormat::Json => eprintln!("{}", text),
        }
    }

    pub fn banner(&self, target: &str) {
        if !self.banner {
            return;
        }
        self.line(format!(
            "\n{}\n{}\n",
            "▓▒░ SWEEPCHAIN ░▒▓  naabu ➜ nmap".truecolor(191, 64, 191).bold(),
            format!("[*] Scanning target: {}", target).truecolor(191, 64, 191)
        ));
    }

    pub fn discovery_started(&self, tool: &str) {
        self.line(format!("[*] Starting full {} sweep...", tool).cyan());
    }

    pub fn discovery_finished(&self, tool: &str, outcome: &DiscoveryOutcome) {
        match outcome {
            DiscoveryOutcome::Found { ports } => {
                self.line(format!("[*] {} found ports: {}", tool, join_ports(ports, ", ")).green());
            }
            DiscoveryOutcome::NoPorts | DiscoveryOutcome::Failed { .. } => {
                self.line("[!] No open ports found, will default to a full range deep scan.".red());
            }
        }
    }

    pub fn deep_scan_started(&self, tool: &str, ports: &[u16]) {
        if !ports.is_empty() {
            self.line(format!("[+] Open ports for {}: {}", tool, join_ports(ports, ",")).green());
        }
        self.line(format!("[*] Running {} deep scan...", tool).cyan());
    }

    pub fn complete(&self) {
        self.line("[+] Discovery + deep scan complete.".green());
    }

    pub fn summary(&self, report: &ScanReport) -> Result<()> {
        if self.silent {
            return Ok(());
        }
        let output = match self.format {
            SummaryFormat::Human => format_human(report),
            SummaryFormat::Json => format!("{}\n", serde_json::to_string_pretty(report)?),
        };
        print!("{}", output);
        io::stdout().flush()?;
        Ok(())
    }
}

pub fn format_human(report: &ScanReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n{} {} {} {} {}\n",
        "⟦".truecolor(64, 64, 64),
        report.target.truecolor(255, 255, 255).bold(),
        "•".truecolor(0, 255, 65),
        report.timing.to_string().truecolor(255, 140, 0).bold(),
        "⟧".truecolor(64, 64, 64)
    ));

    if let ScanState::Aborted(reason) = report.state {
        output.push_str(&format!("{} {}\n", "✗".red().bold(), format!("aborted: {}", reason).red()));
        return output;
    }

    output.push_str(&format!(
        "{} {}\n",
        "⟦".truecolor(64, 64, 64),
        format!("{}ms", (report.end_time - report.start_time).num_milliseconds()).truecolor(0, 212, 255).bold()
    ));

    let discovery = match &report.discovery {
        Some(DiscoveryOutcome::Found { ports }) => format!("{} open ports: {}", ports.len(), join_ports(ports, ",")),
        Some(DiscoveryOutcome::NoPorts) => "no open ports".to_string(),
        Some(DiscoveryOutcome::Failed { reason }) => format!("failed ({})", reason),
        None => "skipped".to_string(),
    };
    output.push_str(&format!("  {} {}\n", "discovery".truecolor(128, 128, 128), discovery));

    let deep = match &report.deep_scan {
        Some(outcome) => {
            let scope = match outcome.scope() {
                PortScope::Restricted => "restricted",
                PortScope::FullRange => "full range",
            };
            match outcome {
                DeepScanOutcome::Completed { .. } => format!("completed ({})", scope),
                DeepScanOutcome::Failed { reason, .. } => format!("failed ({}): {}", scope, reason),
            }
        }
        None => "skipped".to_string(),
    };
    output.push_str(&format!("  {} {}\n", "deep scan".truecolor(128, 128, 128), deep));

    if let Some(DeepScanOutcome::Completed { output: captured, stderr, .. }) = &report.deep_scan {
        if let Some(stderr) = stderr {
            output.push_str(&format!("  {} {}\n", "stderr".truecolor(128, 128, 128), stderr.trim_end()));
        }
        if let Some(captured) = captured {
            output.push('\n');
            output.push_str(captured);
            if !captured.ends_with('\n') {
                output.push('\n');
            }
        }
    }

    output
}

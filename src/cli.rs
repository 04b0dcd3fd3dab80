use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sweepchain")]
#[command(author = "Sweepchain")]
#[command(version = "0.1.0")]
#[command(about = "Fast naabu port discovery followed by a targeted nmap deep scan", long_about = None)]
pub struct Cli {
    #[arg(value_name = "TARGET", help = "Target IP or hostname (used when --target is not given)")]
    pub positional_target: Option<String>,

    #[arg(long = "target", value_name = "TARGET", help = "Target IP or hostname")]
    pub target: Option<String>,

    #[arg(
        long,
        default_value_t = 5000,
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Packets per second for the naabu discovery sweep"
    )]
    pub min_rate: u32,

    #[arg(
        long,
        default_value_t = true,
        action = ArgAction::Set,
        value_name = "BOOL",
        help = "Run both tools through the elevation command (requires running as root)"
    )]
    pub sudo: bool,

    #[arg(
        short = 'T',
        value_name = "TIMING",
        default_value_t = 5,
        value_parser = clap::value_parser!(u8).range(0..=5),
        help = "Nmap timing template (0-5)"
    )]
    pub timing: u8,

    #[arg(long, value_name = "PATH", default_value = "open_ports.txt", help = "Where naabu writes its JSON results")]
    pub artifact: PathBuf,

    #[arg(long, value_name = "BIN", default_value = "naabu", help = "Discovery tool executable")]
    pub discovery_tool: String,

    #[arg(long, value_name = "BIN", default_value = "nmap", help = "Deep scan tool executable")]
    pub deep_scan_tool: String,

    #[arg(long, value_name = "BIN", default_value = "sudo", help = "Privilege elevation command")]
    pub elevate_with: String,

    #[arg(long, help = "Capture tool output instead of streaming it to the terminal")]
    pub capture: bool,

    #[arg(long, value_enum, default_value = "human", help = "Summary format")]
    pub format: SummaryFormat,

    #[arg(long, help = "Exit with status 2 when the nmap scan fails")]
    pub fail_on_deep_scan_error: bool,

    #[arg(long, help = "Disable colored output")]
    pub no_color: bool,

    #[arg(long, help = "Do not print the banner")]
    pub no_banner: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Cli {
    /// `--target` takes precedence over the positional argument.
    pub fn resolved_target(&self) -> String {
        self.target
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .or_else(|| self.positional_target.as_deref().map(str::trim))
            .unwrap_or_default()
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum SummaryFormat {
    #[value(name = "human", help = "Human-readable summary")]
    Human,
    #[value(name = "json", help = "JSON scan report")]
    Json,
}

use anyhow::Result;
use clap::Parser;

use sweepchain::cli::Cli;
use sweepchain::config::ScanConfig;
use sweepchain::logging;
use sweepchain::orchestrator::Orchestrator;
use sweepchain::output::Console;
use sweepchain::privilege::SystemPrivilege;
use sweepchain::process::SystemRunner;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    logging::init(cli.verbose);

    let config = ScanConfig::from_cli(&cli)?;
    let console = Console::new(cli.format, !cli.no_banner);

    let report = Orchestrator::new(&config, &SystemRunner, &SystemPrivilege, &console)
        .run()
        .await;

    console.summary(&report)?;

    std::process::exit(report.exit_code);
}

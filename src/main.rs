//! Scenario Runner CLI - declarative browser-test scenarios
//!
//! Validates scenario files and inspects the execution plan a run would use.

use clap::Parser;
use scenario_runner::commands::Commands;
use scenario_runner::common::{logging, Config};
use scenario_runner::cli;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scenario-runner", about = "Declarative browser-test scenario runner")]
#[command(version, long_about = None)]
struct Cli {
    /// Configuration file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging for this crate
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_cli(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    let result = match config {
        Ok(config) => cli::dispatch(cli.command, &config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

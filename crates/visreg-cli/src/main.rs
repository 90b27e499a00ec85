//! visreg CLI: compare screen captures against approved baselines
//!
//! ## Usage
//!
//! ```bash
//! visreg compare login-form capture.png --json
//! visreg --root target/visreg diff a.png b.png -o diff.png
//! ```

use clap::Parser;
use std::process::ExitCode;
use visreg_cli::{handlers, logging, Cli, CliConfig, CliResult, Commands};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = CliConfig::from_cli(&cli)?;
    config.color.apply();
    logging::init_tracing(config.verbosity);

    match cli.command {
        Commands::Compare(ref args) => handlers::run_compare(&config, args),
        Commands::Approve(ref args) => handlers::run_approve(&config, args),
        Commands::Diff(ref args) => handlers::run_diff(&config, args),
        Commands::Clean => handlers::run_clean(&config),
    }
}

//! `hostscope` CLI - headless consumer of the statistics pipeline
//!
//! Provides commands for printing a one-shot snapshot, watching live
//! statistics, and showing the system identity. Everything goes through the
//! pipeline's read API; the CLI never touches the source directly.

mod cli;
mod commands;
mod config;
mod error;
mod util;

use clap::Parser;
use cli::Cli;
use error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = run(&cli).await;

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    let settings = config::load_settings(cli.config.as_deref())?;
    commands::dispatch(settings, &cli.command).await
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

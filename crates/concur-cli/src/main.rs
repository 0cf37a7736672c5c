use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use concur_cli::commands::profile;
use concur_cli::{Cli, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress goes to stderr at info level unless RUST_LOG says otherwise;
    // stdout carries only the time series.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    profile::run(&cli, &config)
}

//! Profile command: bins COPY concurrency and writes it to stdout.

use std::io::Write as _;

use anyhow::{Context, Result};
use concur_core::{
    BinRow, MalformedPolicy, Period, ProfileConfig, SweepConfig, TimeRange, profile_file,
};

use crate::cli::Cli;
use crate::config::Config;

/// Combine flags and configuration into the settings for one run.
///
/// Flags win over configuration values.
pub fn resolve(cli: &Cli, config: &Config) -> Result<ProfileConfig> {
    let period = match cli.period {
        Some(period) => period,
        None => Period::from_secs(config.period).context("invalid `period` in configuration")?,
    };

    let malformed = if cli.skip_malformed {
        MalformedPolicy::Skip
    } else {
        config.malformed
    };

    Ok(ProfileConfig {
        sweep: SweepConfig {
            period,
            range: TimeRange::new(cli.exclude_before, cli.exclude_after),
            flush_trailing_bin: cli.flush_trailing_bin || config.flush_trailing_bin,
        },
        malformed,
        progress_every: config.progress_every,
    })
}

/// Renders rows as the four-column time series, one line per bin.
pub fn format_rows(rows: &[BinRow]) -> String {
    rows.iter().map(|row| format!("{row}\n")).collect()
}

/// Run the profile command.
pub fn run(cli: &Cli, config: &Config) -> Result<()> {
    let profile_config = resolve(cli, config)?;
    tracing::debug!(?profile_config, "resolved run settings");

    let profile = profile_file(&cli.filename, &profile_config)?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(format_rows(&profile.rows).as_bytes())
        .context("failed to write output")?;
    stdout.flush().context("failed to write output")?;

    tracing::info!(
        records = profile.records,
        skipped = profile.skipped,
        baseline = profile.baseline,
        bins = profile.rows.len(),
        "done"
    );
    Ok(())
}

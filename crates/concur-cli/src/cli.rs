//! Command-line argument definitions.

use std::path::PathBuf;

use clap::Parser;
use concur_core::{Period, Timestamp, parse_timestamp};

/// Concurrency of COPY requests in a WebDAV access log.
///
/// The period covered by the log is split into fixed-width time bins. For
/// each bin, the minimum, average and maximum number of concurrent COPY
/// requests is written to stdout as `<bin end> <min> <average> <max>`.
#[derive(Debug, Parser)]
#[command(name = "concur", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// The path to the access log file.
    #[arg(value_name = "FILE")]
    pub filename: PathBuf,

    /// The number of seconds in each time bin [default: 300].
    #[arg(long, value_name = "PERIOD", value_parser = parse_period)]
    pub period: Option<Period>,

    /// Do not consider any COPY operations that finish before TIMESTAMP.
    #[arg(
        long,
        visible_alias = "exclude_before",
        value_name = "TIMESTAMP",
        value_parser = parse_timestamp
    )]
    pub exclude_before: Option<Timestamp>,

    /// Do not consider any COPY operations that start after TIMESTAMP.
    #[arg(
        long,
        visible_alias = "exclude_after",
        value_name = "TIMESTAMP",
        value_parser = parse_timestamp
    )]
    pub exclude_after: Option<Timestamp>,

    /// Also report the final bin, which the log only partially covers.
    #[arg(long)]
    pub flush_trailing_bin: bool,

    /// Skip COPY lines with missing or invalid fields instead of stopping.
    #[arg(long)]
    pub skip_malformed: bool,
}

/// Parse a bin width in seconds.
fn parse_period(s: &str) -> Result<Period, String> {
    let seconds: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("not a number of seconds: {s}"))?;
    Period::from_secs(seconds).map_err(|e| e.to_string())
}

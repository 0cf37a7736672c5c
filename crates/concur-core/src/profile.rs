//! End-to-end concurrency profile of an access log.
//!
//! Lines → intervals → sorted events → baseline → bin sweep.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::baseline::baseline_concurrency;
use crate::event::{EventStream, EventStreamBuilder};
use crate::record::{RecordError, extract_interval};
use crate::sweep::{BinRow, SweepConfig, sweep};
use crate::types::MalformedPolicy;

/// Default number of lines between progress messages.
pub const DEFAULT_PROGRESS_EVERY: usize = 100_000;

/// Errors that end a profiling run.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The input file could not be opened.
    #[error("failed to open {}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Reading from the input failed part way through.
    #[error("failed to read line {line}")]
    Read {
        line: usize,
        source: std::io::Error,
    },

    /// A COPY line lacked a usable required field.
    #[error("malformed record on line {line}")]
    Record { line: usize, source: RecordError },

    /// No COPY request survived filtering, so there is no first event.
    #[error("no qualifying COPY records found")]
    NoQualifyingRecords,
}

/// Run-scoped settings threaded through extraction and sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileConfig {
    /// Bin width, range and trailing-bin handling.
    pub sweep: SweepConfig,

    /// Handling of COPY lines with missing or invalid fields.
    pub malformed: MalformedPolicy,

    /// Lines between progress messages. Zero disables them.
    pub progress_every: usize,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            sweep: SweepConfig::default(),
            malformed: MalformedPolicy::default(),
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

/// Result of a profiling run.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    /// One row per reported bin, in time order.
    pub rows: Vec<BinRow>,

    /// Requests assumed in flight before the first logged event.
    pub baseline: i64,

    /// COPY requests that contributed events.
    pub records: usize,

    /// Malformed lines skipped under [`MalformedPolicy::Skip`].
    pub skipped: usize,
}

/// Events and bookkeeping gathered from an input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedEvents {
    pub events: EventStream,
    pub records: usize,
    pub skipped: usize,
}

/// Read every line of `reader` and build the sorted event stream.
pub fn load_events<R: BufRead>(
    reader: R,
    config: &ProfileConfig,
) -> Result<LoadedEvents, ProfileError> {
    let range = config.sweep.range;
    let mut builder = EventStreamBuilder::new();
    let mut records = 0;
    let mut skipped = 0;

    // Lines may carry non-UTF-8 bytes in fields we never read; the method,
    // timestamp and duration are ASCII, so lossy decoding leaves them intact.
    for (index, line) in reader.split(b'\n').enumerate() {
        let line_number = index + 1;
        if config.progress_every > 0 && line_number % config.progress_every == 0 {
            tracing::info!(lines = line_number, "lines so far");
        }

        let bytes = line.map_err(|source| ProfileError::Read {
            line: line_number,
            source,
        })?;
        let line = String::from_utf8_lossy(&bytes);

        match extract_interval(&line, &range) {
            Ok(Some(interval)) => {
                builder.push_interval(&interval);
                records += 1;
            }
            Ok(None) => {}
            Err(source) => match config.malformed {
                MalformedPolicy::Abort => {
                    return Err(ProfileError::Record {
                        line: line_number,
                        source,
                    });
                }
                MalformedPolicy::Skip => {
                    tracing::warn!(line = line_number, error = %source, "skipping malformed record");
                    skipped += 1;
                }
            },
        }
    }

    Ok(LoadedEvents {
        events: builder.build(),
        records,
        skipped,
    })
}

/// Profile COPY concurrency from an access log read from `reader`.
pub fn build_profile<R: BufRead>(reader: R, config: &ProfileConfig) -> Result<Profile, ProfileError> {
    let loaded = load_events(reader, config)?;
    if loaded.events.is_empty() {
        return Err(ProfileError::NoQualifyingRecords);
    }

    tracing::info!("evaluating minimum concurrency");
    let baseline = baseline_concurrency(&loaded.events);

    tracing::info!(baseline, "building output");
    let rows = sweep(&loaded.events, baseline, &config.sweep);

    Ok(Profile {
        rows,
        baseline,
        records: loaded.records,
        skipped: loaded.skipped,
    })
}

/// Profile COPY concurrency from the access log at `path`.
pub fn profile_file(path: &Path, config: &ProfileConfig) -> Result<Profile, ProfileError> {
    tracing::info!(path = %path.display(), "loading");
    let file = File::open(path).map_err(|source| ProfileError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    build_profile(BufReader::new(file), config)
}

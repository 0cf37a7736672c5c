//! Core logic for COPY concurrency profiling.
//!
//! This crate contains the fundamental types and logic for:
//! - Record extraction: turning access log lines into request intervals
//! - Event building: START/END events in global time order
//! - Baseline correction: requests already running when the log begins
//! - Bin sweep: per-bin minimum, average and maximum concurrency

pub mod baseline;
pub mod event;
pub mod period;
pub mod profile;
pub mod range;
pub mod record;
pub mod sweep;
pub mod timestamp;
mod types;

pub use baseline::{baseline_concurrency, minimum_concurrency};
pub use event::{Event, EventKind, EventStream, EventStreamBuilder};
pub use period::{DEFAULT_PERIOD_SECS, Period};
pub use profile::{
    DEFAULT_PROGRESS_EVERY, LoadedEvents, Profile, ProfileConfig, ProfileError, build_profile,
    load_events, profile_file,
};
pub use range::TimeRange;
pub use record::{Interval, LogRecord, RecordError, extract_interval};
pub use sweep::{BinRow, BinSweeper, SweepConfig, sweep};
pub use timestamp::{Timestamp, format_timestamp, parse_timestamp};
pub use types::{MalformedPolicy, ValidationError};

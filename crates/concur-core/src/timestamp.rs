//! Timestamp parsing and rendering.
//!
//! Access logs carry ISO 8601 timestamps with sub-second precision and an
//! explicit offset. The offset is kept so that bins line up with the log's
//! own wall clock.

use chrono::{DateTime, Duration, FixedOffset, Timelike};

use crate::types::ValidationError;

/// A point in time as written in the access log.
pub type Timestamp = DateTime<FixedOffset>;

/// Fallback layouts for offsets written without a colon (`+0100`).
const BASIC_OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Parse an ISO 8601 timestamp that carries an explicit offset or `Z`.
///
/// Supports:
/// - RFC 3339: "2019-03-04T10:14:03.512+01:00", "2019-03-04T09:14:03Z"
/// - Basic offset: "2019-03-04T10:14:03.512+0100"
/// - A space in place of the `T` separator
pub fn parse_timestamp(s: &str) -> Result<Timestamp, ValidationError> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts);
    }

    BASIC_OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| ValidationError::InvalidTimestamp {
            value: s.to_string(),
        })
}

/// Render a timestamp as `YYYY-MM-DD HH:MM:SS[.ffffff]+HH:MM`.
///
/// The fractional part only appears when the timestamp has one.
pub fn format_timestamp(ts: &Timestamp) -> String {
    if ts.nanosecond() == 0 {
        ts.format("%Y-%m-%d %H:%M:%S%:z").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S%.6f%:z").to_string()
    }
}

/// Length of a duration in seconds, at microsecond resolution.
#[allow(clippy::cast_precision_loss)]
pub fn total_seconds(d: Duration) -> f64 {
    // Log spans never approach the ~292,000 year overflow of i64 microseconds.
    let micros = d.num_microseconds().unwrap_or(i64::MAX);
    micros as f64 / 1_000_000.0
}

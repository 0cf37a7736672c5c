//! Bin width and bin alignment.

use chrono::{Duration, Timelike};

use crate::timestamp::Timestamp;
use crate::types::ValidationError;

/// Default bin width: five minutes.
pub const DEFAULT_PERIOD_SECS: f64 = 300.0;

/// Width of one time bin.
///
/// Keeps the configured number of seconds for averaging alongside the
/// equivalent duration (rounded to microseconds) for clock arithmetic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Period {
    seconds: f64,
    span: Duration,
}

impl Period {
    /// Creates a period after validation.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_secs(seconds: f64) -> Result<Self, ValidationError> {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(ValidationError::InvalidPeriod { value: seconds });
        }

        let micros = (seconds * 1_000_000.0).round();
        // Keep the span comfortably inside what chrono can add to a timestamp.
        if micros > 1e17 {
            return Err(ValidationError::PeriodTooLarge { value: seconds });
        }
        if micros < 1.0 {
            return Err(ValidationError::InvalidPeriod { value: seconds });
        }

        Ok(Self {
            seconds,
            span: Duration::microseconds(micros as i64),
        })
    }

    /// Bin width in seconds, as configured.
    pub const fn as_secs(&self) -> f64 {
        self.seconds
    }

    /// Bin width as a duration.
    pub const fn span(&self) -> Duration {
        self.span
    }

    /// Start of the bin containing `ts`.
    ///
    /// Bins are laid out from the top of each hour of the timestamp's own
    /// wall clock. Sub-second components are dropped, so the bin start is
    /// always a whole second.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn align(&self, ts: &Timestamp) -> Timestamp {
        let seconds_in_hour = i64::from(ts.minute() * 60 + ts.second());
        let bins_in_hour = (seconds_in_hour as f64 / self.seconds).trunc();
        let aligned = (self.seconds * bins_in_hour).trunc() as i64;
        let start = *ts - Duration::seconds(seconds_in_hour - aligned);
        // Nanosecond 0 is always valid; the fallback never triggers.
        start.with_nanosecond(0).unwrap_or(start)
    }
}

impl Default for Period {
    fn default() -> Self {
        Self {
            seconds: DEFAULT_PERIOD_SECS,
            span: Duration::seconds(300),
        }
    }
}

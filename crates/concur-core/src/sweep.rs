//! Binned concurrency sweep.
//!
//! # Algorithm Summary
//!
//! 1. Align the earliest event down to a bin boundary
//! 2. Walk the sorted events, closing every bin the clock passes
//! 3. Within a bin, integrate concurrency over time and track its extremes
//!
//! A bin is only reported once an event lies at or beyond its end, so the
//! trailing bin is dropped unless explicitly flushed.

use std::fmt;

use crate::event::{Event, EventKind, EventStream};
use crate::period::Period;
use crate::range::TimeRange;
use crate::timestamp::{Timestamp, format_timestamp, total_seconds};

/// Configuration for the sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SweepConfig {
    /// Bin width.
    pub period: Period,

    /// Bins not entirely inside this range are computed but not reported.
    pub range: TimeRange,

    /// Close and report the final, partially observed bin.
    /// Default: false.
    pub flush_trailing_bin: bool,
}

/// Concurrency statistics for one completed bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinRow {
    pub start: Timestamp,
    pub end: Timestamp,
    pub min: i64,
    /// Time-weighted mean concurrency over the bin.
    pub average: f64,
    pub max: i64,
}

impl fmt::Display for BinRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            format_timestamp(&self.end),
            self.min,
            format_average(self.average),
            self.max
        )
    }
}

/// Shortest round-trip form of an average.
///
/// Decimal notation always carries a fractional part (`2.0`). Magnitudes
/// below 1e-4 or from 1e16 up use scientific notation with a signed,
/// two-digit exponent (`3.3333333333333335e-05`).
pub fn format_average(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    if let Some(s) = format_exponent(value) {
        return s;
    }

    let mut s = value.to_string();
    if !s.contains('.') {
        s.push_str(".0");
    }
    s
}

fn format_exponent(value: f64) -> Option<String> {
    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific.split_once('e')?;
    let exponent: i32 = exponent.parse().ok()?;
    if (-4..16).contains(&exponent) {
        return None;
    }
    let sign = if exponent < 0 { '-' } else { '+' };
    Some(format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs()))
}

/// State of the bin currently being filled.
#[derive(Debug, Clone)]
pub struct BinSweeper {
    period: Period,
    range: TimeRange,
    /// Requests currently in flight.
    c: i64,
    bin_start: Timestamp,
    bin_end: Timestamp,
    /// Last instant already integrated into `weighted`.
    last_event: Timestamp,
    min: i64,
    max: i64,
    /// Concurrency-seconds accumulated in the current bin.
    weighted: f64,
}

impl BinSweeper {
    /// Opens the bin containing `first` with `baseline` requests in flight.
    pub fn new(first: &Timestamp, baseline: i64, period: Period, range: TimeRange) -> Self {
        let bin_start = period.align(first);
        Self {
            period,
            range,
            c: baseline,
            bin_start,
            bin_end: bin_start + period.span(),
            last_event: bin_start,
            min: baseline,
            max: baseline,
            weighted: 0.0,
        }
    }

    /// Requests currently in flight.
    pub const fn concurrency(&self) -> i64 {
        self.c
    }

    /// Bounds of the bin currently being filled.
    pub const fn current_bin(&self) -> (Timestamp, Timestamp) {
        (self.bin_start, self.bin_end)
    }

    /// Advances the clock to `event`, closing any bins it passes, then
    /// applies it. Rows for closed bins inside the range go to `emit`.
    ///
    /// Events must be fed in ascending timestamp order.
    #[allow(clippy::cast_possible_truncation)]
    pub fn apply(&mut self, event: &Event, mut emit: impl FnMut(BinRow)) {
        let elapsed = total_seconds(event.timestamp - self.bin_start);
        let mut bins = (elapsed / self.period.as_secs()).trunc() as i64;

        while bins > 0 {
            if let Some(row) = self.close_bin() {
                emit(row);
            }
            bins -= 1;
        }

        self.accumulate_until(event.timestamp);

        match event.kind {
            EventKind::Start => {
                self.c += 1;
                self.max = self.max.max(self.c);
            }
            EventKind::End => {
                self.c -= 1;
                self.min = self.min.min(self.c);
            }
        }
        debug_assert!(self.min <= self.c && self.c <= self.max);

        self.last_event = event.timestamp;
    }

    /// Closes the bin in progress, returning its row if it is in range.
    pub fn flush(&mut self) -> Option<BinRow> {
        self.close_bin()
    }

    #[allow(clippy::cast_precision_loss)]
    fn accumulate_until(&mut self, ts: Timestamp) {
        self.weighted += total_seconds(ts - self.last_event) * self.c as f64;
    }

    fn close_bin(&mut self) -> Option<BinRow> {
        self.accumulate_until(self.bin_end);

        let row = self
            .range
            .admits_bin(&self.bin_start, &self.bin_end)
            .then(|| BinRow {
                start: self.bin_start,
                end: self.bin_end,
                min: self.min,
                average: self.weighted / self.period.as_secs(),
                max: self.max,
            });

        self.min = self.c;
        self.max = self.c;
        self.weighted = 0.0;
        self.bin_start = self.bin_end;
        self.bin_end += self.period.span();
        self.last_event = self.bin_start;
        row
    }
}

/// Sweep a sorted event stream into per-bin concurrency rows.
///
/// Returns an empty list for an empty stream: without a first event there
/// is nothing to anchor the bins to.
pub fn sweep(events: &EventStream, baseline: i64, config: &SweepConfig) -> Vec<BinRow> {
    let Some(first) = events.first() else {
        return Vec::new();
    };

    let mut sweeper = BinSweeper::new(&first.timestamp, baseline, config.period, config.range);
    let mut rows = Vec::new();
    for event in events {
        sweeper.apply(event, |row| rows.push(row));
    }

    if config.flush_trailing_bin {
        rows.extend(sweeper.flush());
    }

    tracing::debug!(
        rows = rows.len(),
        final_concurrency = sweeper.concurrency(),
        "sweep complete"
    );
    rows
}

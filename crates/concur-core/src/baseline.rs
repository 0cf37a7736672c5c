//! Starting concurrency for logs that begin mid-flight.
//!
//! Requests already running when the log starts only contribute an END
//! event. Replaying the stream from zero then dips below zero; the depth of
//! that dip is the number of requests open before the first event.

use crate::event::EventStream;

/// Lowest running concurrency reached when replaying `events` from zero.
///
/// Never positive, since the replay starts at zero.
pub fn minimum_concurrency(events: &EventStream) -> i64 {
    events
        .iter()
        .scan(0_i64, |c, event| {
            *c += event.kind.delta();
            Some(*c)
        })
        .fold(0, i64::min)
}

/// Concurrency to seed the sweep with, so that it never goes negative.
pub fn baseline_concurrency(events: &EventStream) -> i64 {
    let baseline = -minimum_concurrency(events);
    tracing::debug!(baseline, "evaluated minimum concurrency");
    baseline
}

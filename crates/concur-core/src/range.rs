//! Inclusion range applied to operations and to reported bins.

use crate::timestamp::Timestamp;

/// Optional lower and upper bounds on the period of interest.
///
/// The same bounds gate two things: which operations contribute events, and
/// which completed bins are reported. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    /// Ignore operations finishing before, and bins starting before, this instant.
    pub exclude_before: Option<Timestamp>,
    /// Ignore operations starting after, and bins ending after, this instant.
    pub exclude_after: Option<Timestamp>,
}

impl TimeRange {
    /// Creates a range from optional bounds.
    pub const fn new(exclude_before: Option<Timestamp>, exclude_after: Option<Timestamp>) -> Self {
        Self {
            exclude_before,
            exclude_after,
        }
    }

    /// Whether an operation spanning `[start, end]` overlaps the range.
    pub fn admits_interval(&self, start: &Timestamp, end: &Timestamp) -> bool {
        !self.exclude_before.is_some_and(|before| *end < before)
            && !self.exclude_after.is_some_and(|after| *start > after)
    }

    /// Whether a bin `[start, end)` lies entirely inside the range.
    pub fn admits_bin(&self, start: &Timestamp, end: &Timestamp) -> bool {
        self.exclude_before.is_none_or(|before| *start >= before)
            && self.exclude_after.is_none_or(|after| *end <= after)
    }
}

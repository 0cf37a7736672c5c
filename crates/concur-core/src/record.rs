//! Access log record extraction.
//!
//! Each access log line is a sequence of whitespace separated attributes,
//! either `key=value` or `key="value with spaces"`. Only three of them matter
//! here: the request method, the completion timestamp and the duration.

use std::sync::LazyLock;

use chrono::Duration;
use regex::Regex;
use thiserror::Error;

use crate::range::TimeRange;
use crate::timestamp::{Timestamp, parse_timestamp};

/// The only request method whose concurrency is profiled.
pub const TARGET_METHOD: &str = "COPY";

/// Attribute holding the request method.
pub const METHOD_FIELD: &str = "request.method";
/// Attribute holding the completion timestamp.
pub const TIMESTAMP_FIELD: &str = "ts";
/// Attribute holding the request duration in milliseconds.
pub const DURATION_FIELD: &str = "duration";

/// Pre-compiled attribute tokenizer. Quoted values are taken verbatim
/// between the quotes, with no escape processing.
static ATTRIBUTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([^\s=]+)=(?:"([^"]*)"|(\S*))"#).unwrap());

/// Errors for a single log line that cannot be turned into an interval.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A required attribute was not present on the line.
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    /// The completion timestamp could not be parsed.
    #[error("invalid `ts` value: {value}")]
    InvalidTimestamp { value: String },

    /// The duration was not a non-negative whole number of milliseconds.
    #[error("invalid `duration` value: {value}")]
    InvalidDuration { value: String },
}

/// The attributes of one access log line that the profiler reads.
///
/// Values borrow from the line. Later occurrences of an attribute replace
/// earlier ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogRecord<'a> {
    method: Option<&'a str>,
    ts: Option<&'a str>,
    duration: Option<&'a str>,
}

impl<'a> LogRecord<'a> {
    /// Tokenizes a line, keeping only the attributes of interest.
    pub fn parse(line: &'a str) -> Self {
        let mut record = Self::default();
        for caps in ATTRIBUTE_RE.captures_iter(line) {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map_or("", |m| m.as_str());
            match &caps[1] {
                METHOD_FIELD => record.method = Some(value),
                TIMESTAMP_FIELD => record.ts = Some(value),
                DURATION_FIELD => record.duration = Some(value),
                _ => {}
            }
        }
        record
    }

    /// The request method.
    pub fn method(&self) -> Result<&'a str, RecordError> {
        self.method.ok_or(RecordError::MissingField {
            field: METHOD_FIELD,
        })
    }

    /// The completion timestamp.
    pub fn completed_at(&self) -> Result<Timestamp, RecordError> {
        let raw = self.ts.ok_or(RecordError::MissingField {
            field: TIMESTAMP_FIELD,
        })?;
        parse_timestamp(raw).map_err(|_| RecordError::InvalidTimestamp {
            value: raw.to_string(),
        })
    }

    /// The request duration.
    pub fn duration(&self) -> Result<Duration, RecordError> {
        let raw = self.duration.ok_or(RecordError::MissingField {
            field: DURATION_FIELD,
        })?;
        let invalid = || RecordError::InvalidDuration {
            value: raw.to_string(),
        };
        let ms: i64 = raw.trim().parse().map_err(|_| invalid())?;
        if ms < 0 {
            return Err(invalid());
        }
        Ok(Duration::milliseconds(ms))
    }
}

/// The span of one COPY request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Interval {
    /// Reconstructs the span from the logged completion time and duration.
    pub fn from_completion(end: Timestamp, duration: Duration) -> Option<Self> {
        let start = end.checked_sub_signed(duration)?;
        Some(Self { start, end })
    }
}

/// Extract the COPY interval described by one log line.
///
/// Returns `Ok(None)` for blank lines, lines for other methods and
/// intervals outside `range`.
pub fn extract_interval(line: &str, range: &TimeRange) -> Result<Option<Interval>, RecordError> {
    if line.trim().is_empty() {
        return Ok(None);
    }

    let record = LogRecord::parse(line);
    if record.method()? != TARGET_METHOD {
        return Ok(None);
    }

    let end = record.completed_at()?;
    if range.exclude_before.is_some_and(|before| end < before) {
        return Ok(None);
    }

    let duration = record.duration()?;
    let interval =
        Interval::from_completion(end, duration).ok_or_else(|| RecordError::InvalidDuration {
            value: duration.num_milliseconds().to_string(),
        })?;

    if range.admits_interval(&interval.start, &interval.end) {
        Ok(Some(interval))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COPY_LINE: &str = r#"level=INFO ts=2019-03-04T10:14:03.512+01:00 event=org.dcache.webdav.request request.method=COPY request.url=https://door.example.org/data/file1 response.code=201 user-agent="fts url-copy 3.8" duration=1512"#;

    fn at(s: &str) -> Timestamp {
        parse_timestamp(s).unwrap()
    }

    #[test]
    fn parses_required_fields() {
        let record = LogRecord::parse(COPY_LINE);
        assert_eq!(record.method().unwrap(), "COPY");
        assert_eq!(
            record.completed_at().unwrap(),
            at("2019-03-04T10:14:03.512+01:00")
        );
        assert_eq!(record.duration().unwrap(), Duration::milliseconds(1512));
    }

    #[test]
    fn quoted_values_may_contain_spaces() {
        let record = LogRecord::parse(r#"request.method="COPY" ts="2019-03-04T10:14:03Z" duration="5""#);
        assert_eq!(record.method().unwrap(), "COPY");
        assert_eq!(record.duration().unwrap(), Duration::milliseconds(5));

        let record = LogRecord::parse(r#"note="request.method=PUT here" request.method=COPY"#);
        assert_eq!(record.method().unwrap(), "COPY");
    }

    #[test]
    fn later_attribute_wins() {
        let record = LogRecord::parse("request.method=GET request.method=COPY");
        assert_eq!(record.method().unwrap(), "COPY");
    }

    #[test]
    fn empty_value_is_present_but_empty() {
        let record = LogRecord::parse("request.method= ts=x");
        assert_eq!(record.method().unwrap(), "");
    }

    #[test]
    fn builds_interval_from_completion_and_duration() {
        let interval = extract_interval(COPY_LINE, &TimeRange::default())
            .unwrap()
            .unwrap();
        assert_eq!(interval.end, at("2019-03-04T10:14:03.512+01:00"));
        assert_eq!(interval.start, at("2019-03-04T10:14:02+01:00"));
    }

    #[test]
    fn zero_duration_gives_instant_interval() {
        let line = "request.method=COPY ts=2019-03-04T10:14:03Z duration=0";
        let interval = extract_interval(line, &TimeRange::default()).unwrap().unwrap();
        assert_eq!(interval.start, interval.end);
    }

    #[test]
    fn other_methods_are_ignored() {
        let line = "request.method=GET ts=2019-03-04T10:14:03Z duration=10";
        assert_eq!(extract_interval(line, &TimeRange::default()), Ok(None));
    }

    #[test]
    fn other_methods_need_no_timestamp() {
        assert_eq!(
            extract_interval("request.method=PUT", &TimeRange::default()),
            Ok(None)
        );
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(extract_interval("   ", &TimeRange::default()), Ok(None));
        assert_eq!(extract_interval("", &TimeRange::default()), Ok(None));
    }

    #[test]
    fn missing_method_is_an_error() {
        let err = extract_interval("ts=2019-03-04T10:14:03Z duration=10", &TimeRange::default())
            .unwrap_err();
        assert_eq!(
            err,
            RecordError::MissingField {
                field: METHOD_FIELD
            }
        );
        assert_eq!(err.to_string(), "missing required field `request.method`");
    }

    #[test]
    fn missing_duration_is_an_error() {
        let err = extract_interval("request.method=COPY ts=2019-03-04T10:14:03Z", &TimeRange::default())
            .unwrap_err();
        assert_eq!(
            err,
            RecordError::MissingField {
                field: DURATION_FIELD
            }
        );
    }

    #[test]
    fn bad_values_are_errors() {
        let range = TimeRange::default();
        assert!(matches!(
            extract_interval("request.method=COPY ts=soon duration=10", &range),
            Err(RecordError::InvalidTimestamp { .. })
        ));
        assert!(matches!(
            extract_interval("request.method=COPY ts=2019-03-04T10:14:03Z duration=1.5", &range),
            Err(RecordError::InvalidDuration { .. })
        ));
        assert!(matches!(
            extract_interval("request.method=COPY ts=2019-03-04T10:14:03Z duration=-1", &range),
            Err(RecordError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn range_filter_is_inclusive() {
        let range = TimeRange::new(
            Some(at("2019-03-04T10:00:00Z")),
            Some(at("2019-03-04T11:00:00Z")),
        );

        // Ends exactly on the lower bound.
        let line = "request.method=COPY ts=2019-03-04T10:00:00Z duration=60000";
        assert!(extract_interval(line, &range).unwrap().is_some());

        // Ends just before it.
        let line = "request.method=COPY ts=2019-03-04T09:59:59.999Z duration=60000";
        assert_eq!(extract_interval(line, &range), Ok(None));

        // Starts exactly on the upper bound.
        let line = "request.method=COPY ts=2019-03-04T11:01:00Z duration=60000";
        assert!(extract_interval(line, &range).unwrap().is_some());

        // Starts just after it.
        let line = "request.method=COPY ts=2019-03-04T11:01:00.001Z duration=60000";
        assert_eq!(extract_interval(line, &range), Ok(None));
    }
}

//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for run configuration values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The bin width was zero, negative or not a number.
    #[error("period must be a positive number of seconds, got {value}")]
    InvalidPeriod { value: f64 },

    /// The bin width was too large to represent as a duration.
    #[error("period of {value} seconds is too large")]
    PeriodTooLarge { value: f64 },

    /// A timestamp did not match any accepted ISO 8601 form.
    #[error("invalid timestamp: {value} (expected ISO 8601 with offset, e.g. 2019-03-04T10:14:03.512+01:00)")]
    InvalidTimestamp { value: String },

    /// Invalid malformed-record policy value.
    #[error("invalid malformed-record policy: {value} (expected \"abort\" or \"skip\")")]
    InvalidPolicy { value: String },
}

/// What to do with a COPY line that lacks a usable required field.
///
/// This enum encodes the valid policies, preventing invalid string values
/// from reaching the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Stop the run and report the offending line.
    #[default]
    Abort,
    /// Log the offending line and carry on without it.
    Skip,
}

impl MalformedPolicy {
    /// String representation used in configuration files.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Abort => "abort",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for MalformedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MalformedPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            _ => Err(ValidationError::InvalidPolicy {
                value: s.to_string(),
            }),
        }
    }
}

//! Error types for model construction.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised when building a [`ChangeRecord`](crate::ChangeRecord).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The path was empty (or only separators / whitespace).
    #[error("invalid record: empty path {0:?}")]
    EmptyPath(String),

    /// The path climbs out of the watched folder with `..`.
    #[error("invalid record: parent segment in path {0:?}")]
    ParentSegment(String),
}

/// Errors raised when building a [`ReportWindow`](crate::ReportWindow).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    /// `since` is not strictly before `until`.
    #[error("invalid window: since {since} is not before until {until}")]
    InvertedRange {
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    },

    /// A custom window was requested without a start time.
    #[error("invalid window: custom period requires an explicit since")]
    MissingSince,

    /// The period token was not recognized.
    #[error("unknown period: {0}")]
    UnknownPeriod(String),
}

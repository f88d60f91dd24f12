//! Report windows.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WindowError;

/// Timestamp format used in window labels.
const LABEL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Period token requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    /// The last ten minutes.
    TenMin,
    /// The last hour.
    Hour,
    /// The last 24 hours.
    Day,
    /// An explicit start time up to now.
    Custom,
}

impl Period {
    /// Fixed lookback for the non-custom periods.
    pub fn lookback(&self) -> Option<Duration> {
        match self {
            Self::TenMin => Some(Duration::minutes(10)),
            Self::Hour => Some(Duration::hours(1)),
            Self::Day => Some(Duration::hours(24)),
            Self::Custom => None,
        }
    }

    /// Canonical token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TenMin => "10min",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = WindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "10min" | "10m" | "ten_min" | "tenmin" => Ok(Self::TenMin),
            "hour" | "1h" | "hourly" => Ok(Self::Hour),
            "day" | "24h" | "daily" => Ok(Self::Day),
            "custom" => Ok(Self::Custom),
            other => Err(WindowError::UnknownPeriod(other.to_string())),
        }
    }
}

/// The `[since, until)` range a report covers.
///
/// `until` is captured once when the window is built and never re-read, so
/// the report header always describes the window the data was collected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportWindow {
    period: Period,
    since: DateTime<Utc>,
    until: DateTime<Utc>,
}

impl ReportWindow {
    /// Creates a window, rejecting `since >= until`.
    pub fn new(
        period: Period,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Self, WindowError> {
        if since >= until {
            return Err(WindowError::InvertedRange { since, until });
        }
        Ok(Self {
            period,
            since,
            until,
        })
    }

    /// Requested period.
    pub fn period(&self) -> Period {
        self.period
    }

    /// Inclusive start.
    pub fn since(&self) -> DateTime<Utc> {
        self.since
    }

    /// Exclusive end.
    pub fn until(&self) -> DateTime<Utc> {
        self.until
    }

    /// Length of the window.
    pub fn duration(&self) -> Duration {
        self.until - self.since
    }

    /// Whether a timestamp falls inside `[since, until)`.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.since && at < self.until
    }

    /// Human label used in report headers and subjects.
    pub fn label(&self) -> String {
        match self.period {
            Period::TenMin => "Past 10 Minutes".to_string(),
            Period::Hour => "Past Hour".to_string(),
            Period::Day => "Past 24 Hours".to_string(),
            Period::Custom => format!(
                "Since {} to {}",
                self.since.format(LABEL_TIME_FORMAT),
                self.until.format(LABEL_TIME_FORMAT)
            ),
        }
    }
}

//! Resolving a period token into a concrete report window.
//!
//! A window is resolved exactly once per report. The same value is then
//! used to select changes, and to render the header, so `until` always
//! reflects collection time rather than render time.

use chrono::{DateTime, Utc};
use changewatch_models::{Period, ReportWindow, WindowError};

use crate::error::Result;

/// Resolve a window ending now.
///
/// `custom_since` is required for [`Period::Custom`] and ignored otherwise.
pub fn resolve(period: Period, custom_since: Option<DateTime<Utc>>) -> Result<ReportWindow> {
    resolve_at(period, custom_since, Utc::now())
}

/// Resolve a window ending at `now`.
pub fn resolve_at(
    period: Period,
    custom_since: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<ReportWindow> {
    let since = match period.lookback() {
        Some(lookback) => now - lookback,
        None => custom_since.ok_or(WindowError::MissingSince)?,
    };
    Ok(ReportWindow::new(period, since, now)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_hour_window_spans_exactly_one_hour() {
        let window = resolve(Period::Hour, None).unwrap();
        assert_eq!(window.until() - window.since(), Duration::hours(1));
        assert_eq!(window.period(), Period::Hour);
    }

    #[test]
    fn test_fixed_lookbacks() {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();

        let w = resolve_at(Period::TenMin, None, now).unwrap();
        assert_eq!(w.since(), now - Duration::minutes(10));
        assert_eq!(w.until(), now);

        let w = resolve_at(Period::Day, None, now).unwrap();
        assert_eq!(w.since(), now - Duration::hours(24));
    }

    #[test]
    fn test_custom_requires_since() {
        let err = resolve(Period::Custom, None).unwrap_err();
        assert!(matches!(
            err,
            ReportError::InvalidWindow(WindowError::MissingSince)
        ));
    }

    #[test]
    fn test_custom_window() {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        let since = now - Duration::hours(3);
        let w = resolve_at(Period::Custom, Some(since), now).unwrap();
        assert_eq!(w.since(), since);
        assert_eq!(w.until(), now);
    }

    #[test]
    fn test_custom_since_in_future_rejected() {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        let err = resolve_at(Period::Custom, Some(now + Duration::minutes(5)), now).unwrap_err();
        assert!(matches!(
            err,
            ReportError::InvalidWindow(WindowError::InvertedRange { .. })
        ));
    }

    #[test]
    fn test_custom_since_ignored_for_fixed_periods() {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        let w = resolve_at(Period::Hour, Some(now - Duration::days(7)), now).unwrap();
        assert_eq!(w.duration(), Duration::hours(1));
    }
}

//! Runtime configuration.

use std::time::Duration;

use changewatch_models::Period;

/// Configuration for the polling and reporting loops.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// How often to pull the change source.
    pub poll_interval: Duration,
    /// How often to generate and dispatch a report.
    pub report_interval: Duration,
    /// Window each scheduled report covers.
    pub report_period: Period,
    /// Maximum classifications running at once.
    pub classify_concurrency: usize,
    /// How long observed changes are kept in the log.
    pub retention: chrono::Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            report_interval: Duration::from_secs(3600),
            report_period: Period::Hour,
            classify_concurrency: 4,
            retention: chrono::Duration::days(7),
        }
    }
}

impl RuntimeConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the report interval.
    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }

    /// Sets the period of scheduled reports.
    pub fn with_report_period(mut self, period: Period) -> Self {
        self.report_period = period;
        self
    }

    /// Sets the classification concurrency (at least 1).
    pub fn with_classify_concurrency(mut self, concurrency: usize) -> Self {
        self.classify_concurrency = concurrency.max(1);
        self
    }

    /// Sets the change log retention.
    pub fn with_retention(mut self, retention: chrono::Duration) -> Self {
        self.retention = retention;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RuntimeConfig::default();

        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.report_interval, Duration::from_secs(3600));
        assert_eq!(config.report_period, Period::Hour);
        assert_eq!(config.classify_concurrency, 4);
        assert_eq!(config.retention, chrono::Duration::days(7));
    }

    #[test]
    fn test_config_builder() {
        let config = RuntimeConfig::new()
            .with_poll_interval(Duration::from_millis(100))
            .with_report_interval(Duration::from_secs(600))
            .with_report_period(Period::TenMin)
            .with_classify_concurrency(0)
            .with_retention(chrono::Duration::days(1));

        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert_eq!(config.report_interval, Duration::from_secs(600));
        assert_eq!(config.report_period, Period::TenMin);
        assert_eq!(config.classify_concurrency, 1);
        assert_eq!(config.retention, chrono::Duration::days(1));
    }
}

//! Command-line interface definition using clap.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use changewatch_models::Period;

/// changewatch - file activity reports for a storage account
#[derive(Parser, Debug)]
#[command(name = "changewatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to state directory
    #[arg(short, long, env = "CHANGEWATCH_STATE_DIR", global = true)]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a report from the change log
    Report {
        /// Window to report on (10min, hour, day, custom)
        #[arg(short, long, default_value = "hour")]
        period: Period,

        /// Start of a custom window (RFC 3339, "YYYY-MM-DD HH:MM" or "YYYY-MM-DD", UTC)
        #[arg(long, value_parser = parse_since)]
        since: Option<DateTime<Utc>>,

        /// Local mirror of the storage folder to sample file contents from
        #[arg(short, long)]
        mirror: Option<String>,

        /// Download content samples from the storage account
        #[arg(long, conflicts_with = "mirror")]
        remote: bool,

        /// Skip content classification
        #[arg(long, conflicts_with_all = ["mirror", "remote"])]
        no_classify: bool,

        /// Override how many directories and file types are listed
        #[arg(long)]
        top_k: Option<usize>,

        /// Deliver the report (relay if configured, otherwise the outbox)
        #[arg(long)]
        send: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Record changed paths in the change log (reads stdin when none given)
    Ingest {
        /// Changed paths
        paths: Vec<String>,
    },

    /// Pull the storage account listing once
    Poll {
        /// Folder to watch
        #[arg(long, env = "CHANGEWATCH_STORAGE_ROOT", default_value = "")]
        root: String,

        /// Record every file of a first listing instead of only storing the cursor
        #[arg(long)]
        initial: bool,
    },

    /// Poll and report continuously until interrupted
    Run {
        /// Window each scheduled report covers
        #[arg(short, long, default_value = "hour")]
        period: Period,

        /// Seconds between listing polls
        #[arg(long, default_value_t = 60)]
        poll_secs: u64,

        /// Seconds between reports (defaults to the period length)
        #[arg(long)]
        report_secs: Option<u64>,

        /// Maximum concurrent classifications
        #[arg(long, default_value_t = 4)]
        concurrency: usize,

        /// Folder to watch
        #[arg(long, env = "CHANGEWATCH_STORAGE_ROOT", default_value = "")]
        root: String,

        /// Local mirror to sample file contents from
        #[arg(short, long)]
        mirror: Option<String>,

        /// Skip content classification
        #[arg(long, conflicts_with = "mirror")]
        no_classify: bool,
    },

    /// Show the window a period resolves to
    Window {
        #[arg(short, long, default_value = "hour")]
        period: Period,

        #[arg(long, value_parser = parse_since)]
        since: Option<DateTime<Utc>>,
    },
}

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Parse a UTC start time in one of the accepted layouts.
pub fn parse_since(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M") {
        return Ok(naive.and_utc());
    }
    if let Some(naive) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(naive.and_utc());
    }
    Err(format!("invalid start time: {}", raw))
}

impl Cli {
    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_report_defaults() {
        let cli = Cli::parse_from(["changewatch", "report"]);
        match cli.command {
            Commands::Report {
                period,
                since,
                send,
                format,
                ..
            } => {
                assert_eq!(period, Period::Hour);
                assert!(since.is_none());
                assert!(!send);
                assert_eq!(format, OutputFormat::Text);
            }
            _ => panic!("Expected Report command"),
        }
    }

    #[test]
    fn test_cli_parse_custom_report() {
        let cli = Cli::parse_from([
            "changewatch",
            "report",
            "--period",
            "custom",
            "--since",
            "2026-03-01 08:30",
            "--no-classify",
        ]);
        match cli.command {
            Commands::Report {
                period,
                since,
                no_classify,
                ..
            } => {
                assert_eq!(period, Period::Custom);
                assert_eq!(since, Some(Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap()));
                assert!(no_classify);
            }
            _ => panic!("Expected Report command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_period() {
        assert!(Cli::try_parse_from(["changewatch", "report", "--period", "week"]).is_err());
    }

    #[test]
    fn test_cli_parse_ingest() {
        let cli = Cli::parse_from(["changewatch", "ingest", "a.md", "docs/b.md"]);
        match cli.command {
            Commands::Ingest { paths } => assert_eq!(paths, vec!["a.md", "docs/b.md"]),
            _ => panic!("Expected Ingest command"),
        }
    }

    #[test]
    fn test_cli_verbose() {
        let cli = Cli::parse_from(["changewatch", "window", "-vvv"]);
        assert_eq!(cli.verbose, 3);
        assert_eq!(cli.log_level(), tracing::Level::TRACE);
    }

    #[test]
    fn test_parse_since_layouts() {
        let expected = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_since("2026-03-01").unwrap(), expected);
        assert_eq!(parse_since("2026-03-01T00:00:00Z").unwrap(), expected);
        assert_eq!(parse_since("2026-03-01T01:00:00+01:00").unwrap(), expected);
        assert!(parse_since("yesterday").is_err());
    }

    #[test]
    fn test_cli_help() {
        Cli::command().debug_assert();
    }
}

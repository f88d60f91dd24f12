//! Shared configuration for changewatch.
//!
//! Provides functions to locate changewatch's state directory and common
//! files, the environment keys the binaries read, and the tunables used when
//! analyzing and rendering a report.
//!
//! # Storage Structure
//!
//! All application data is stored under `~/.changewatch/`:
//!
//! ```text
//! ~/.changewatch/
//! ├── config/       # .env.local with tokens and recipients
//! ├── logs/         # Application logs
//! ├── outbox/       # Rendered report messages awaiting delivery
//! └── state/        # changes.json, cursor.json
//! ```
//!
//! # Environment Variables
//!
//! - `CHANGEWATCH_STATE_DIR`: Override the base state directory
//! - `CHANGEWATCH_RECIPIENTS`: Comma-separated default report recipients
//! - `CHANGEWATCH_WEBHOOK_URL`: HTTP relay used to deliver reports
//! - `CHANGEWATCH_STORAGE_TOKEN`: Bearer token for the storage account API
//! - `CHANGEWATCH_STORAGE_ROOT`: Folder to watch in the storage account

use std::path::PathBuf;
use std::sync::OnceLock;

use changewatch_models::Period;
use tracing::debug;

/// Environment variable for custom state directory.
pub const STATE_DIR_ENV: &str = "CHANGEWATCH_STATE_DIR";

/// Environment variable for default recipients.
pub const RECIPIENTS_ENV: &str = "CHANGEWATCH_RECIPIENTS";

/// Environment variable for the delivery relay URL.
pub const WEBHOOK_URL_ENV: &str = "CHANGEWATCH_WEBHOOK_URL";

/// Environment variable for the storage account token.
pub const STORAGE_TOKEN_ENV: &str = "CHANGEWATCH_STORAGE_TOKEN";

/// Environment variable for the watched storage folder.
pub const STORAGE_ROOT_ENV: &str = "CHANGEWATCH_STORAGE_ROOT";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".changewatch";

// Subdirectory names
const CONFIG_SUBDIR: &str = "config";
const LOGS_SUBDIR: &str = "logs";
const OUTBOX_SUBDIR: &str = "outbox";
const STATE_SUBDIR: &str = "state";

static STATE_DIR_CACHE: OnceLock<PathBuf> = OnceLock::new();

/// Get the changewatch state directory.
///
/// The state directory is determined by:
/// 1. `CHANGEWATCH_STATE_DIR` environment variable if set
/// 2. `~/.changewatch` if home directory is available
/// 3. `.changewatch` in current directory as fallback
pub fn state_dir() -> PathBuf {
    STATE_DIR_CACHE
        .get_or_init(|| {
            std::env::var(STATE_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    dirs::home_dir()
                        .map(|h| h.join(DEFAULT_STATE_DIR))
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
                })
        })
        .clone()
}

/// Get the user config directory.
pub fn config_dir() -> PathBuf {
    state_dir().join(CONFIG_SUBDIR)
}

/// Get the logs directory.
pub fn logs_dir() -> PathBuf {
    state_dir().join(LOGS_SUBDIR)
}

/// Get the outbox directory where rendered reports are queued.
pub fn outbox_dir() -> PathBuf {
    state_dir().join(OUTBOX_SUBDIR)
}

/// Get the runtime state directory.
pub fn runtime_state_dir() -> PathBuf {
    state_dir().join(STATE_SUBDIR)
}

/// Get the change log file path.
pub fn changes_file() -> PathBuf {
    runtime_state_dir().join("changes.json")
}

/// Get the listing cursor file path.
pub fn cursor_file() -> PathBuf {
    runtime_state_dir().join("cursor.json")
}

/// Get the .env.local file path.
///
/// Environment file for secrets (storage token, relay URL).
pub fn env_file() -> PathBuf {
    config_dir().join(".env.local")
}

/// Load environment files.
///
/// The config directory's `.env.local` is read first, then `./.env.local`
/// or `./.env`. Variables already set in the process environment win.
pub fn load_env() {
    let path = env_file();
    if path.exists() {
        if let Err(e) = dotenvy::from_path(&path) {
            debug!(path = %path.display(), error = %e, "failed to load env file");
        }
    }
    let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());
}

/// Default recipients from `CHANGEWATCH_RECIPIENTS`.
pub fn default_recipients() -> Vec<String> {
    std::env::var(RECIPIENTS_ENV)
        .map(|v| parse_recipients(&v))
        .unwrap_or_default()
}

/// Split a comma-separated recipient list, dropping blanks.
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Ensure the state directory and all subdirectories exist.
///
/// # Errors
/// Returns an error if any directory cannot be created.
pub fn ensure_all_dirs() -> std::io::Result<()> {
    std::fs::create_dir_all(config_dir())?;
    std::fs::create_dir_all(logs_dir())?;
    std::fs::create_dir_all(outbox_dir())?;
    std::fs::create_dir_all(runtime_state_dir())?;
    Ok(())
}

/// Tunables for analysis and rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    /// Length of the ranked directory and file-type lists.
    pub top_k: usize,
    /// Activity is `high` when the change count is above this.
    pub high_threshold: usize,
    /// Activity is `light` when the change count is below this.
    pub light_threshold: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            high_threshold: 100,
            light_threshold: 10,
        }
    }
}

impl ReportConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults suited to a period.
    ///
    /// Short windows see far fewer changes, so their intensity thresholds
    /// are lower. Quick and ad-hoc windows keep shorter ranked lists.
    pub fn for_period(period: Period) -> Self {
        let top_k = match period {
            Period::TenMin | Period::Custom => 3,
            Period::Hour | Period::Day => 5,
        };
        let (high_threshold, light_threshold) = match period {
            Period::TenMin | Period::Hour => (10, 3),
            Period::Day | Period::Custom => (100, 10),
        };
        Self {
            top_k,
            high_threshold,
            light_threshold,
        }
    }

    /// Sets the ranked list length.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Sets the high-activity threshold.
    pub fn with_high_threshold(mut self, threshold: usize) -> Self {
        self.high_threshold = threshold;
        self
    }

    /// Sets the light-activity threshold.
    pub fn with_light_threshold(mut self, threshold: usize) -> Self {
        self.light_threshold = threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_paths() {
        assert!(changes_file().ends_with("state/changes.json"));
        assert!(cursor_file().ends_with("state/cursor.json"));
        assert!(outbox_dir().ends_with("outbox"));
        assert!(env_file().ends_with(".env.local"));
    }

    #[test]
    fn test_parse_recipients() {
        assert_eq!(
            parse_recipients(" a@example.com, ,b@example.com "),
            vec!["a@example.com".to_string(), "b@example.com".to_string()]
        );
        assert!(parse_recipients("").is_empty());
    }

    #[test]
    fn test_for_period() {
        let quick = ReportConfig::for_period(Period::TenMin);
        assert_eq!(quick.top_k, 3);
        assert_eq!(quick.high_threshold, 10);

        let day = ReportConfig::for_period(Period::Day);
        assert_eq!(day, ReportConfig::default());

        assert_eq!(ReportConfig::for_period(Period::Custom).top_k, 3);
    }

    #[test]
    fn test_builder() {
        let config = ReportConfig::new()
            .with_top_k(2)
            .with_high_threshold(50)
            .with_light_threshold(5);
        assert_eq!(config.top_k, 2);
        assert_eq!(config.high_threshold, 50);
        assert_eq!(config.light_threshold, 5);
    }
}

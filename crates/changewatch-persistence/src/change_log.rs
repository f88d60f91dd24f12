//! Deduplicated log of observed changes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use changewatch_core::{ChangeSink, SinkError};
use changewatch_models::{ChangeRecord, ObservedChange, ReportWindow};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::atomic::{atomic_write_json, read_json_optional};
use crate::error::{PersistenceError, Result};

/// Default age after which changes are pruned.
pub const DEFAULT_RETENTION_DAYS: i64 = 7;

#[derive(Debug, Default, Serialize, Deserialize)]
struct ChangeLogFile {
    #[serde(default)]
    changes: Vec<ObservedChange>,
}

/// Stores observed changes in a single JSON file.
///
/// ```text
/// state/
/// └── changes.json   # { "changes": [ { path, observed_at, metadata }, ... ] }
/// ```
///
/// The same event reported twice (same [`ObservedChange::dedup_key`]) is
/// stored once. Entries older than the retention period are dropped on every
/// write. Entries are kept in `observed_at` order. Paths that cannot form a
/// [`ChangeRecord`] are never stored.
pub struct ChangeLog {
    path: PathBuf,
    retention: Duration,
    write_lock: Mutex<()>,
}

impl ChangeLog {
    /// Creates a log backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            retention: Duration::days(DEFAULT_RETENTION_DAYS),
            write_lock: Mutex::new(()),
        }
    }

    /// Sets the retention period.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends changes, skipping ones already stored. Returns how many were new.
    pub fn append(&self, changes: &[ObservedChange]) -> Result<usize> {
        self.append_at(changes, Utc::now())
    }

    /// [`append`](Self::append) with an explicit clock for pruning.
    pub fn append_at(&self, changes: &[ObservedChange], now: DateTime<Utc>) -> Result<usize> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| PersistenceError::LockPoisoned(e.to_string()))?;

        let mut file = self.read_file()?;
        let cutoff = now - self.retention;
        let before = file.changes.len();
        file.changes.retain(|c| c.observed_at >= cutoff);
        let pruned = before - file.changes.len();

        let mut seen: HashSet<String> = file.changes.iter().map(|c| c.dedup_key()).collect();
        let mut added = 0;
        for change in changes {
            if change.observed_at < cutoff {
                continue;
            }
            if let Err(e) = ChangeRecord::new(&change.path) {
                warn!(path = %change.path, error = %e, "skipping malformed change path");
                continue;
            }
            if seen.insert(change.dedup_key()) {
                file.changes.push(change.clone());
                added += 1;
            }
        }

        if added == 0 && pruned == 0 {
            return Ok(0);
        }

        file.changes.sort_by_key(|c| c.observed_at);
        atomic_write_json(&self.path, &file)?;

        debug!(
            path = %self.path.display(),
            added,
            pruned,
            total = file.changes.len(),
            "updated change log"
        );
        Ok(added)
    }

    /// All stored changes, oldest first.
    pub fn load(&self) -> Result<Vec<ObservedChange>> {
        Ok(self.read_file()?.changes)
    }

    /// Changes observed in `[since, until)`, oldest first.
    pub fn changes_between(
        &self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<ObservedChange>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|c| c.observed_at >= since && c.observed_at < until)
            .collect())
    }

    /// Paths of the changes inside a report window, oldest first.
    ///
    /// Malformed paths left by older files are skipped.
    pub fn paths_in(&self, window: &ReportWindow) -> Result<Vec<String>> {
        Ok(self
            .changes_between(window.since(), window.until())?
            .into_iter()
            .filter(|c| match ChangeRecord::new(&c.path) {
                Ok(_) => true,
                Err(e) => {
                    warn!(path = %c.path, error = %e, "ignoring malformed logged path");
                    false
                }
            })
            .map(|c| c.path)
            .collect())
    }

    fn read_file(&self) -> Result<ChangeLogFile> {
        Ok(read_json_optional(&self.path)?.unwrap_or_default())
    }
}

impl ChangeSink for ChangeLog {
    fn record(&self, changes: &[ObservedChange]) -> std::result::Result<usize, SinkError> {
        self.append(changes).map_err(|e| SinkError(e.to_string()))
    }
}

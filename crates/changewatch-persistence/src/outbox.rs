//! File-backed report outbox.
//!
//! Each dispatched report becomes one JSON file under the outbox directory,
//! named so that a directory listing sorts oldest first. A separate delivery
//! process (or a person) picks them up from there.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use changewatch_core::{DispatchError, Dispatcher, ReportMessage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::atomic::{atomic_write_json, ensure_dir, read_json_optional, remove_if_exists};
use crate::error::{PersistenceError, Result};

/// A report waiting in the outbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxEntry {
    pub id: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Writes reports to a directory instead of sending them.
#[derive(Debug, Clone)]
pub struct Outbox {
    dir: PathBuf,
    default_recipients: Vec<String>,
}

impl Outbox {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            default_recipients: Vec::new(),
        }
    }

    /// Recipients used when a message names none.
    pub fn with_default_recipients(mut self, recipients: Vec<String>) -> Self {
        self.default_recipients = recipients;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Queue a message, returning the file it was written to.
    pub fn enqueue(&self, message: &ReportMessage) -> std::result::Result<PathBuf, DispatchError> {
        let to = message.resolve_recipients(&self.default_recipients)?;
        let entry = OutboxEntry {
            id: message.id.clone(),
            to,
            subject: message.subject.clone(),
            text: message.body.clone(),
            created_at: message.created_at,
        };

        let path = self.entry_path(&entry);
        atomic_write_json(&path, &entry).map_err(|e| DispatchError::Delivery(e.to_string()))?;
        info!(id = %entry.id, path = %path.display(), "Queued report in outbox");
        Ok(path)
    }

    /// Entries still waiting, oldest first. Unreadable files are skipped.
    pub fn pending(&self) -> Result<Vec<OutboxEntry>> {
        ensure_dir(&self.dir)?;
        let read_dir = fs::read_dir(&self.dir).map_err(|source| PersistenceError::ReadError {
            path: self.dir.clone(),
            source,
        })?;

        let mut entries = Vec::new();
        for dir_entry in read_dir.flatten() {
            let path = dir_entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_json_optional::<OutboxEntry>(&path) {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable outbox entry"),
            }
        }

        entries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(entries)
    }

    /// Remove a delivered entry. Returns whether it existed.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let Some(entry) = self.pending()?.into_iter().find(|e| e.id == id) else {
            return Ok(false);
        };
        remove_if_exists(&self.entry_path(&entry))?;
        debug!(id, "Removed outbox entry");
        Ok(true)
    }

    fn entry_path(&self, entry: &OutboxEntry) -> PathBuf {
        self.dir.join(format!(
            "{}-{}.json",
            entry.created_at.format("%Y%m%dT%H%M%S"),
            entry.id
        ))
    }
}

impl Dispatcher for Outbox {
    fn dispatch(&self, message: &ReportMessage) -> std::result::Result<(), DispatchError> {
        self.enqueue(message).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::tempdir;

    fn message_at(subject: &str, created_at: DateTime<Utc>) -> ReportMessage {
        let mut message = ReportMessage::new(subject, "body text");
        message.created_at = created_at;
        message
    }

    #[test]
    fn test_dispatch_writes_entry_with_defaults() {
        let dir = tempdir().unwrap();
        let outbox = Outbox::new(dir.path().join("outbox"))
            .with_default_recipients(vec!["team@example.com".to_string()]);

        let message = ReportMessage::new("File Activity Report: Past Hour (2 changes)", "body");
        let path = outbox.enqueue(&message).unwrap();
        assert!(path.exists());

        let pending = outbox.pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].to, vec!["team@example.com"]);
        assert_eq!(pending[0].subject, message.subject);
        assert_eq!(pending[0].text, "body");
    }

    #[test]
    fn test_dispatch_without_recipients_fails() {
        let dir = tempdir().unwrap();
        let outbox = Outbox::new(dir.path());

        let result = outbox.dispatch(&ReportMessage::new("s", "b"));
        assert!(matches!(result, Err(DispatchError::NoRecipients)));
        assert!(outbox.pending().unwrap().is_empty());
    }

    #[test]
    fn test_pending_is_oldest_first_and_remove() {
        let dir = tempdir().unwrap();
        let outbox = Outbox::new(dir.path())
            .with_default_recipients(vec!["a@example.com".to_string()]);
        let base = Utc.with_ymd_and_hms(2026, 4, 2, 9, 0, 0).unwrap();

        let newer = message_at("newer", base + Duration::hours(1));
        let older = message_at("older", base);
        outbox.dispatch(&newer).unwrap();
        outbox.dispatch(&older).unwrap();

        let subjects: Vec<String> = outbox.pending().unwrap().into_iter().map(|e| e.subject).collect();
        assert_eq!(subjects, vec!["older", "newer"]);

        assert!(outbox.remove(&older.id).unwrap());
        assert!(!outbox.remove(&older.id).unwrap());
        assert_eq!(outbox.pending().unwrap().len(), 1);
    }

    #[test]
    fn test_non_json_files_ignored() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("README.txt"), "not an entry").unwrap();
        let outbox = Outbox::new(dir.path());
        assert!(outbox.pending().unwrap().is_empty());
    }
}

//! Raw observed changes as handed to persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Optional details reported by the storage account for a change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeMetadata {
    /// Server-side revision identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// File size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Server modification time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_modified: Option<DateTime<Utc>>,
    /// Whether the entry was a deletion.
    #[serde(default)]
    pub deleted: bool,
}

/// A `(path, observed_at, metadata)` tuple for one change event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedChange {
    /// Path as reported by the source.
    pub path: String,
    /// When the change was observed.
    pub observed_at: DateTime<Utc>,
    /// Source-provided details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ChangeMetadata>,
}

impl ObservedChange {
    /// Creates a change without metadata.
    pub fn new(path: impl Into<String>, observed_at: DateTime<Utc>) -> Self {
        Self {
            path: path.into(),
            observed_at,
            metadata: None,
        }
    }

    /// Attaches metadata.
    pub fn with_metadata(mut self, metadata: ChangeMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Key used to recognize the same event reported twice.
    ///
    /// A server revision identifies an event on its own; without one the
    /// observation time stands in for it.
    pub fn dedup_key(&self) -> String {
        match self.metadata.as_ref().and_then(|m| m.rev.as_deref()) {
            Some(rev) => format!("{}@rev:{}", self.path, rev),
            None => format!("{}@{}", self.path, self.observed_at.to_rfc3339()),
        }
    }
}

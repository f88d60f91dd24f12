//! Aggregated activity statistics.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::record::{ChangeRecord, ContentType};

/// One entry of a ranked tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    /// Directory or extension.
    pub key: String,
    /// Number of records that fell into this bucket.
    pub count: usize,
}

impl RankedEntry {
    pub fn new(key: impl Into<String>, count: usize) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }
}

/// A record whose classification failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationFailure {
    /// Path of the record.
    pub path: String,
    /// Why classification was unavailable.
    pub reason: String,
}

/// Statistics derived from one batch of change records.
///
/// Built fresh for every report and dropped after rendering; nothing in here
/// is carried between reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivityPattern {
    /// Number of input records, duplicates included.
    pub total_changes: usize,
    /// Busiest directories, highest count first.
    pub top_directories: Vec<RankedEntry>,
    /// Most changed extensions, highest count first.
    pub top_file_types: Vec<RankedEntry>,
    /// Occurrences per content type over classified records.
    pub content_counts: BTreeMap<ContentType, usize>,
    /// Successfully classified records, in input order.
    pub classified_records: Vec<ChangeRecord>,
    /// Records whose classification was unavailable, in input order.
    pub failed_classifications: Vec<ClassificationFailure>,
}

impl ActivityPattern {
    /// True when no changes were observed.
    pub fn is_empty(&self) -> bool {
        self.total_changes == 0
    }

    /// Count for a single content type.
    pub fn content_count(&self, content_type: ContentType) -> usize {
        self.content_counts.get(&content_type).copied().unwrap_or(0)
    }

    /// The busiest directory, if any.
    pub fn top_directory(&self) -> Option<&RankedEntry> {
        self.top_directories.first()
    }
}

//! Change records and their content classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// Directory value for files that live at the root of the account.
///
/// Path normalization drops `.` segments, so no real directory can collide
/// with this value.
pub const TOP_LEVEL_DIR: &str = ".";

/// Placeholder topic used when nothing more specific was found.
pub const DEFAULT_TOPIC: &str = "general";

/// Coarse classification of a file's purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Prose: notes, reports, write-ups.
    Document,
    /// Source code and scripts.
    Code,
    /// Structured data: spreadsheets, JSON, CSV.
    Data,
    /// Anything the classifier could not place.
    Unknown,
}

impl ContentType {
    /// Lower-case name used in rendered text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Code => "code",
            Self::Data => "data",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Coarse content type.
    pub content_type: ContentType,
    /// One-line human summary of the content.
    pub summary: String,
    /// Most salient keywords, most frequent first.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Topics from the classifier's vocabulary.
    #[serde(default)]
    pub topics: Vec<String>,
}

impl Classification {
    /// Creates a classification with no keywords or topics.
    pub fn new(content_type: ContentType, summary: impl Into<String>) -> Self {
        Self {
            content_type,
            summary: summary.into(),
            keywords: Vec::new(),
            topics: Vec::new(),
        }
    }

    /// Sets the keywords.
    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    /// Sets the topics.
    pub fn with_topics(mut self, topics: Vec<String>) -> Self {
        self.topics = topics;
        self
    }

    /// True when the topic list carries something beyond the default placeholder.
    pub fn has_notable_topics(&self) -> bool {
        self.topics.iter().any(|t| t != DEFAULT_TOPIC)
    }
}

/// One observed file change plus its derived fields.
///
/// `directory` and `extension` are computed from `path` once at construction
/// and the path cannot be changed afterwards, so the three never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRecord {
    path: String,
    directory: String,
    extension: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    classification: Option<Classification>,
}

impl ChangeRecord {
    /// Builds a record from a raw path.
    ///
    /// The path is normalized (trimmed, `\` turned into `/`, empty and `.`
    /// segments dropped). A path that normalizes to nothing, or that contains
    /// a `..` segment, is rejected.
    pub fn new(path: impl AsRef<str>) -> Result<Self, RecordError> {
        let raw = path.as_ref();
        let segments: Vec<&str> = raw
            .trim()
            .split(['/', '\\'])
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();

        if segments.contains(&"..") {
            return Err(RecordError::ParentSegment(raw.to_string()));
        }

        let Some((file_name, parents)) = segments.split_last() else {
            return Err(RecordError::EmptyPath(raw.to_string()));
        };

        let directory = if parents.is_empty() {
            TOP_LEVEL_DIR.to_string()
        } else {
            parents.join("/")
        };

        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        Ok(Self {
            path: segments.join("/"),
            directory,
            extension,
            classification: None,
        })
    }

    /// Normalized path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Parent directory, or [`TOP_LEVEL_DIR`] for root-level files.
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Lower-cased extension; empty when the file name has no `.`.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Final path segment.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Whether this record sits at the top level.
    pub fn is_top_level(&self) -> bool {
        self.directory == TOP_LEVEL_DIR
    }

    /// Classification, if one was attached.
    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    /// Content type, if classified.
    pub fn content_type(&self) -> Option<ContentType> {
        self.classification.as_ref().map(|c| c.content_type)
    }

    /// Keywords; empty when unclassified.
    pub fn keywords(&self) -> &[String] {
        self.classification
            .as_ref()
            .map(|c| c.keywords.as_slice())
            .unwrap_or(&[])
    }

    /// Topics; empty when unclassified.
    pub fn topics(&self) -> &[String] {
        self.classification
            .as_ref()
            .map(|c| c.topics.as_slice())
            .unwrap_or(&[])
    }

    /// Attaches a classification result.
    pub fn set_classification(&mut self, classification: Classification) {
        self.classification = Some(classification);
    }

    /// Builder form of [`set_classification`](Self::set_classification).
    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = Some(classification);
        self
    }
}

//! Content classification capability.
//!
//! The analyzer depends only on the [`ContentClassifier`] trait. A classifier
//! must be idempotent, must not have side effects the analyzer can observe,
//! and must report failure through [`ClassificationUnavailable`] instead of
//! panicking, so one unreadable file never blanks out the rest of a report.
//!
//! [`HeuristicClassifier`] is the built-in implementation: an extension
//! table for the content type, keyword frequency over a content sample, and
//! a fixed topic vocabulary with a `general` fallback.

mod fetcher;
mod heuristic;
mod vocabulary;

use std::sync::Arc;

use changewatch_models::{ChangeRecord, Classification};
use thiserror::Error;

pub use self::fetcher::{ContentFetcher, FetchError, LocalFetcher};
pub use self::heuristic::HeuristicClassifier;
pub use self::vocabulary::{content_type_for_extension, extract_keywords, match_topics, tokenize};

/// Classification could not be produced for one record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("classification unavailable for {path}: {reason}")]
pub struct ClassificationUnavailable {
    /// Path of the record.
    pub path: String,
    /// Human-readable cause.
    pub reason: String,
}

impl ClassificationUnavailable {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Maps a change record to a content type, keywords, and topics.
pub trait ContentClassifier: Send + Sync {
    /// Classify one record.
    fn classify(&self, record: &ChangeRecord) -> Result<Classification, ClassificationUnavailable>;
}

impl<T: ContentClassifier + ?Sized> ContentClassifier for Arc<T> {
    fn classify(&self, record: &ChangeRecord) -> Result<Classification, ClassificationUnavailable> {
        (**self).classify(record)
    }
}

impl<T: ContentClassifier + ?Sized> ContentClassifier for &T {
    fn classify(&self, record: &ChangeRecord) -> Result<Classification, ClassificationUnavailable> {
        (**self).classify(record)
    }
}

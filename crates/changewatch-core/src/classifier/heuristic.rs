//! Extension and keyword based classifier.

use std::sync::Arc;

use changewatch_models::{ChangeRecord, Classification, ContentType};
use tracing::trace;

use super::fetcher::ContentFetcher;
use super::vocabulary::{
    content_type_for_extension, extract_keywords, is_text_extension, match_topics, tokenize,
};
use super::{ClassificationUnavailable, ContentClassifier};

/// Default number of bytes read from each file.
pub const DEFAULT_SAMPLE_BYTES: usize = 4096;

/// Default number of keywords kept per file.
pub const DEFAULT_MAX_KEYWORDS: usize = 5;

/// Maximum length of a one-line summary, in characters.
const SUMMARY_MAX_CHARS: usize = 80;

/// Classifies files by extension, then enriches text files from a content
/// sample when a fetcher is configured.
///
/// Without a fetcher (or for binary formats) keywords and topics come from
/// the file name and directory alone.
#[derive(Clone)]
pub struct HeuristicClassifier {
    fetcher: Option<Arc<dyn ContentFetcher>>,
    sample_bytes: usize,
    max_keywords: usize,
}

impl Default for HeuristicClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicClassifier {
    /// Classifier that never reads file content.
    pub fn new() -> Self {
        Self {
            fetcher: None,
            sample_bytes: DEFAULT_SAMPLE_BYTES,
            max_keywords: DEFAULT_MAX_KEYWORDS,
        }
    }

    /// Classifier that samples text files through `fetcher`.
    pub fn with_fetcher(fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self {
            fetcher: Some(fetcher),
            ..Self::new()
        }
    }

    /// Sets how many bytes are sampled per file.
    pub fn sample_bytes(mut self, bytes: usize) -> Self {
        self.sample_bytes = bytes;
        self
    }

    /// Sets how many keywords are kept per file.
    pub fn max_keywords(mut self, max: usize) -> Self {
        self.max_keywords = max;
        self
    }

    fn fetch(&self, record: &ChangeRecord) -> Result<Option<String>, ClassificationUnavailable> {
        let Some(fetcher) = &self.fetcher else {
            return Ok(None);
        };
        if !is_text_extension(record.extension()) {
            return Ok(None);
        }
        fetcher
            .fetch_sample(record.path(), self.sample_bytes)
            .map(Some)
            .map_err(|e| ClassificationUnavailable::new(record.path(), e.to_string()))
    }
}

impl ContentClassifier for HeuristicClassifier {
    fn classify(&self, record: &ChangeRecord) -> Result<Classification, ClassificationUnavailable> {
        let content_type = content_type_for_extension(record.extension());
        let content = self.fetch(record)?;

        let name_tokens = tokenize(file_stem(record.file_name()));
        let keywords = match &content {
            Some(text) => extract_keywords(&tokenize(text), self.max_keywords),
            None => extract_keywords(&name_tokens, self.max_keywords),
        };

        let mut topic_tokens = tokenize(record.directory());
        topic_tokens.extend(name_tokens);
        if let Some(text) = &content {
            topic_tokens.extend(tokenize(text));
        }
        let topics = match_topics(&topic_tokens);

        let summary = content
            .as_deref()
            .and_then(first_meaningful_line)
            .unwrap_or_else(|| describe(content_type, record.extension()));

        trace!(
            path = %record.path(),
            content_type = %content_type,
            keywords = keywords.len(),
            "classified record"
        );

        Ok(Classification::new(content_type, summary)
            .with_keywords(keywords)
            .with_topics(topics))
    }
}

/// File name without its final extension.
fn file_stem(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

/// First line carrying real text, stripped of markup and truncated.
fn first_meaningful_line(text: &str) -> Option<String> {
    text.lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(['#', '/', '*', '-', '>', '!', ';'])
                .trim()
        })
        .find(|line| line.chars().filter(|c| c.is_alphabetic()).count() >= 3)
        .map(truncate)
}

fn truncate(line: &str) -> String {
    if line.chars().count() > SUMMARY_MAX_CHARS {
        let head: String = line.chars().take(SUMMARY_MAX_CHARS - 3).collect();
        format!("{}...", head.trim_end())
    } else {
        line.to_string()
    }
}

/// Fallback summary when no content sample is available.
fn describe(content_type: ContentType, extension: &str) -> String {
    let kind = match content_type {
        ContentType::Document => "Document",
        ContentType::Code => "Source code",
        ContentType::Data => "Data file",
        ContentType::Unknown => "File",
    };
    if extension.is_empty() {
        kind.to_string()
    } else {
        format!("{} (.{})", kind, extension)
    }
}

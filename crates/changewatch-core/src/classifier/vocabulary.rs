//! Extension tables, stopwords, and the topic vocabulary.

use std::collections::HashMap;
use std::sync::LazyLock;

use changewatch_models::{ContentType, DEFAULT_TOPIC};
use regex::Regex;

/// Alphabetic word tokens.
static WORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z]+").expect("Invalid word regex"));

/// Keywords shorter than this are dropped.
const MIN_KEYWORD_LEN: usize = 4;

const DOCUMENT_EXTENSIONS: &[&str] = &[
    "doc", "docx", "md", "markdown", "odt", "pages", "pdf", "rst", "rtf", "tex", "txt",
];

const CODE_EXTENSIONS: &[&str] = &[
    "c", "cc", "cpp", "cs", "css", "go", "h", "hpp", "html", "java", "js", "jsx", "kt", "lua",
    "php", "py", "rb", "rs", "scala", "sh", "sql", "swift", "ts", "tsx", "vue",
];

const DATA_EXTENSIONS: &[&str] = &[
    "csv", "db", "ini", "json", "jsonl", "numbers", "ods", "parquet", "sqlite", "toml", "tsv",
    "xls", "xlsx", "xml", "yaml", "yml",
];

/// Extensions whose bytes are not readable text even when the type is known.
const BINARY_EXTENSIONS: &[&str] = &[
    "db", "doc", "docx", "numbers", "ods", "odt", "pages", "parquet", "pdf", "sqlite", "xls",
    "xlsx",
];

const STOPWORDS: &[&str] = &[
    "about", "above", "after", "again", "also", "because", "been", "before", "being", "below",
    "between", "both", "could", "does", "doing", "down", "during", "each", "from", "further",
    "have", "having", "here", "into", "just", "more", "most", "much", "must", "only", "other",
    "over", "same", "should", "some", "such", "than", "that", "their", "them", "then", "there",
    "these", "they", "this", "those", "through", "under", "until", "very", "were", "what",
    "when", "where", "which", "while", "will", "with", "would", "your",
];

/// Fixed topic vocabulary: topic name and the words that point to it.
const TOPICS: &[(&str, &[&str])] = &[
    (
        "finance",
        &["budget", "cost", "expense", "expenses", "invoice", "payment", "revenue", "tax", "salary"],
    ),
    (
        "planning",
        &["deadline", "goal", "goals", "milestone", "plan", "planning", "roadmap", "schedule", "timeline"],
    ),
    (
        "meetings",
        &["agenda", "attendees", "meeting", "minutes", "standup", "sync"],
    ),
    (
        "engineering",
        &["api", "bug", "build", "deploy", "fix", "release", "refactor", "server", "test", "tests"],
    ),
    (
        "research",
        &["analysis", "experiment", "findings", "hypothesis", "research", "results", "study", "survey"],
    ),
    (
        "legal",
        &["agreement", "clause", "compliance", "contract", "license", "policy", "terms"],
    ),
    (
        "marketing",
        &["brand", "campaign", "customer", "customers", "launch", "marketing", "sales"],
    ),
    (
        "personal",
        &["family", "health", "journal", "personal", "recipe", "travel", "vacation"],
    ),
];

/// Coarse content type for an extension.
pub fn content_type_for_extension(extension: &str) -> ContentType {
    if DOCUMENT_EXTENSIONS.contains(&extension) {
        ContentType::Document
    } else if CODE_EXTENSIONS.contains(&extension) {
        ContentType::Code
    } else if DATA_EXTENSIONS.contains(&extension) {
        ContentType::Data
    } else {
        ContentType::Unknown
    }
}

/// Whether a sample of this file can be read as text.
pub fn is_text_extension(extension: &str) -> bool {
    content_type_for_extension(extension) != ContentType::Unknown
        && !BINARY_EXTENSIONS.contains(&extension)
}

/// Lower-cased alphabetic tokens, in order.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD_REGEX
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Most frequent non-stopword tokens.
///
/// Ties are broken alphabetically so the result is stable across runs.
pub fn extract_keywords(tokens: &[String], max: usize) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for token in tokens {
        if token.len() >= MIN_KEYWORD_LEN && !STOPWORDS.contains(&token.as_str()) {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(max)
        .map(|(word, _)| word.to_string())
        .collect()
}

/// Topics whose trigger words appear in the tokens.
///
/// Ordered by number of hits, then vocabulary order. Falls back to the
/// default topic when nothing matched.
pub fn match_topics(tokens: &[String]) -> Vec<String> {
    let mut hits: Vec<(usize, &str)> = TOPICS
        .iter()
        .filter_map(|(topic, triggers)| {
            let count = tokens
                .iter()
                .filter(|t| triggers.contains(&t.as_str()))
                .count();
            (count > 0).then_some((count, *topic))
        })
        .collect();

    if hits.is_empty() {
        return vec![DEFAULT_TOPIC.to_string()];
    }

    // Stable sort keeps vocabulary order among equal counts.
    hits.sort_by(|a, b| b.0.cmp(&a.0));
    hits.into_iter().map(|(_, topic)| topic.to_string()).collect()
}

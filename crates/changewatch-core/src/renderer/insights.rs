//! Rule-based observations derived from an activity pattern.

use std::fmt;

use changewatch_models::{ActivityPattern, ContentType};

use super::{display_directory, plural};
use crate::config::ReportConfig;

/// Directory name fragments that hint at the kind of work being done.
const DIRECTORY_HINTS: &[(&str, &str)] = &[
    ("project", "active project work"),
    ("doc", "active documentation work"),
];

/// Content types that get an insight, in display order, with their singular
/// and plural nouns and what the change suggests.
const CONTENT_INSIGHTS: &[(ContentType, &str, &str, &str)] = &[
    (
        ContentType::Document,
        "document",
        "documents",
        "points to writing or editing work",
    ),
    (
        ContentType::Code,
        "code file",
        "code files",
        "points to active development",
    ),
    (
        ContentType::Data,
        "data file",
        "data files",
        "suggests data updates or analysis",
    ),
];

/// Overall activity level of a report window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intensity {
    Light,
    Moderate,
    High,
}

impl Intensity {
    /// Judge a change count against the configured thresholds.
    pub fn assess(total_changes: usize, config: &ReportConfig) -> Self {
        if total_changes > config.high_threshold {
            Self::High
        } else if total_changes < config.light_threshold {
            Self::Light
        } else {
            Self::Moderate
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All insight sentences, in display order.
pub fn derive_insights(pattern: &ActivityPattern, config: &ReportConfig) -> Vec<String> {
    let mut insights = Vec::new();

    if let Some(top) = pattern.top_directory() {
        insights.push(directory_insight(&top.key, top.count));
    }

    for &(content_type, singular, plural_noun, meaning) in CONTENT_INSIGHTS {
        let count = pattern.content_count(content_type);
        if count > 0 {
            insights.push(format!(
                "{} changed, which {}.",
                plural(count, singular, plural_noun),
                meaning
            ));
        }
    }

    let intensity = Intensity::assess(pattern.total_changes, config);
    insights.push(format!(
        "Activity level: {} ({} in this period).",
        intensity,
        plural(pattern.total_changes, "change", "changes")
    ));

    insights
}

fn directory_insight(directory: &str, count: usize) -> String {
    let lowered = directory.to_lowercase();
    let hint = DIRECTORY_HINTS
        .iter()
        .find(|(fragment, _)| lowered.contains(fragment))
        .map(|(_, hint)| *hint);

    let name = display_directory(directory);
    let changes = plural(count, "change", "changes");
    match hint {
        Some(hint) => format!(
            "Most activity was in \"{}\" ({}), which suggests {}.",
            name, changes, hint
        ),
        None => format!(
            "Most activity was in \"{}\" ({}). You may want to review these changes.",
            name, changes
        ),
    }
}

//! Narrative report rendering.
//!
//! Sections are emitted in a fixed order:
//! 1. **Header** - window label
//! 2. **Summary** - change count, or the quiet-period sentence (which ends
//!    the report)
//! 3. **Activity Analysis** - ranked directories and file types, then one
//!    block per classified file; omitted when there is nothing to list
//! 4. **Insights** - rule-based observations
//! 5. **Footer** - generation time
//!
//! Apart from the footer timestamp, output depends only on the window and
//! the pattern, so identical inputs render identical text.

mod insights;

use chrono::{DateTime, Utc};
use changewatch_models::{
    ActivityPattern, ChangeRecord, RankedEntry, ReportWindow, DEFAULT_TOPIC, TOP_LEVEL_DIR,
};

use crate::config::ReportConfig;

pub use self::insights::{derive_insights, Intensity};

/// Sentence rendered when a window saw no changes.
pub const QUIET_PERIOD: &str = "No file changes were recorded. It was a quiet period.";

/// Label for records without an extension.
pub const NO_EXTENSION: &str = "no extension";

/// Label for the top-level directory.
pub const TOP_LEVEL_LABEL: &str = "top level";

const FOOTER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Renders an activity pattern as plain-text narrative.
#[derive(Debug, Clone, Default)]
pub struct NarrativeRenderer {
    config: ReportConfig,
}

impl NarrativeRenderer {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Render with the current time in the footer.
    pub fn render(&self, window: &ReportWindow, pattern: &ActivityPattern) -> String {
        self.render_at(window, pattern, Utc::now())
    }

    /// Render with an explicit footer timestamp.
    pub fn render_at(
        &self,
        window: &ReportWindow,
        pattern: &ActivityPattern,
        generated_at: DateTime<Utc>,
    ) -> String {
        let mut lines = Vec::new();
        push_heading(&mut lines, &format!("File Activity Report: {}", window.label()), '=');
        lines.push(String::new());

        if pattern.is_empty() {
            lines.push(QUIET_PERIOD.to_string());
            return finish(lines);
        }

        push_heading(&mut lines, "Summary", '-');
        lines.push(format!(
            "{} recorded.",
            plural(pattern.total_changes, "file change was", "file changes were")
        ));
        lines.push(String::new());

        let has_analysis = !pattern.top_directories.is_empty()
            || !pattern.top_file_types.is_empty()
            || !pattern.classified_records.is_empty();
        if has_analysis {
            push_analysis(&mut lines, pattern);
        }

        push_heading(&mut lines, "Insights", '-');
        for insight in derive_insights(pattern, &self.config) {
            lines.push(format!("- {}", insight));
        }
        lines.push(String::new());

        lines.push("---".to_string());
        lines.push(format!(
            "Generated at {}",
            generated_at.format(FOOTER_TIME_FORMAT)
        ));
        finish(lines)
    }
}

/// Display name for a directory key.
pub fn display_directory(key: &str) -> String {
    if key == TOP_LEVEL_DIR {
        TOP_LEVEL_LABEL.to_string()
    } else {
        key.to_string()
    }
}

/// Display name for an extension key.
pub fn display_extension(key: &str) -> String {
    if key.is_empty() {
        NO_EXTENSION.to_string()
    } else {
        format!(".{}", key)
    }
}

/// `"1 file"` / `"3 files"`.
pub(crate) fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

fn push_heading(lines: &mut Vec<String>, title: &str, underline: char) {
    lines.push(title.to_string());
    lines.push(underline.to_string().repeat(title.chars().count()));
}

fn push_analysis(lines: &mut Vec<String>, pattern: &ActivityPattern) {
    push_heading(lines, "Activity Analysis", '-');
    let start = lines.len();
    push_ranking(
        lines,
        "Most active directories:",
        &pattern.top_directories,
        display_directory,
    );
    push_ranking(
        lines,
        "Most changed file types:",
        &pattern.top_file_types,
        display_extension,
    );
    if !pattern.classified_records.is_empty() {
        if lines.len() > start {
            lines.push(String::new());
        }
        lines.push("Content details:".to_string());
        for record in &pattern.classified_records {
            push_content_block(lines, record);
        }
    }
    lines.push(String::new());
}

fn push_ranking(
    lines: &mut Vec<String>,
    title: &str,
    entries: &[RankedEntry],
    display: fn(&str) -> String,
) {
    if entries.is_empty() {
        return;
    }
    lines.push(title.to_string());
    for entry in entries {
        lines.push(format!(
            "  - {} ({})",
            display(&entry.key),
            plural(entry.count, "change", "changes")
        ));
    }
}

fn push_content_block(lines: &mut Vec<String>, record: &ChangeRecord) {
    let Some(classification) = record.classification() else {
        return;
    };

    lines.push(format!("  * {} [{}]", record.file_name(), classification.content_type));
    lines.push(format!("    Summary: {}", classification.summary));
    if !classification.keywords.is_empty() {
        lines.push(format!("    Keywords: {}", classification.keywords.join(", ")));
    }
    if classification.has_notable_topics() {
        let topics: Vec<&str> = classification
            .topics
            .iter()
            .map(String::as_str)
            .filter(|t| *t != DEFAULT_TOPIC)
            .collect();
        lines.push(format!("    Topics: {}", topics.join(", ")));
    }
}

fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

//! Activity analysis: records, tallies, and rankings.
//!
//! # Pipeline
//!
//! 1. **Build** - turn every raw path into a [`ChangeRecord`]; one bad path
//!    aborts before anything is tallied
//! 2. **Classify** - optionally attach a classification to each record;
//!    failures are logged and remembered but never abort
//! 3. **Aggregate** - tally directories, extensions, and content types,
//!    then rank with a deterministic tie-break
//!
//! Callers that classify concurrently run steps 1 and 3 themselves and do
//! their own fan-out in between. Aggregation only ever sees the joined result.

use std::collections::{BTreeMap, HashMap};

use changewatch_models::{ActivityPattern, ChangeRecord, ClassificationFailure, RankedEntry};
use tracing::{debug, warn};

use crate::classifier::ContentClassifier;
use crate::config::ReportConfig;
use crate::error::Result;

/// Builds [`ActivityPattern`]s from batches of raw change paths.
///
/// Holds configuration only; every call starts from empty tallies.
#[derive(Debug, Clone)]
pub struct ActivityAnalyzer {
    top_k: usize,
}

impl Default for ActivityAnalyzer {
    fn default() -> Self {
        Self::from_config(&ReportConfig::default())
    }
}

impl ActivityAnalyzer {
    /// Analyzer keeping the `top_k` busiest entries per ranking.
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }

    /// Analyzer using a report config's ranking length.
    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.top_k)
    }

    /// Ranking length.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Build, classify, and aggregate in one call.
    ///
    /// # Errors
    /// Returns [`ReportError::InvalidRecord`](crate::ReportError::InvalidRecord)
    /// if any path is malformed. Classification problems are not errors.
    pub fn analyze<S: AsRef<str>>(
        &self,
        paths: &[S],
        classifier: Option<&dyn ContentClassifier>,
    ) -> Result<ActivityPattern> {
        let mut records = build_records(paths)?;
        let failures = match classifier {
            Some(classifier) => classify_records(&mut records, classifier),
            None => Vec::new(),
        };
        Ok(self.aggregate(records, failures))
    }

    /// Tally and rank an already-built batch.
    ///
    /// Every record counts as one occurrence; there is no dedup by path.
    pub fn aggregate(
        &self,
        records: Vec<ChangeRecord>,
        failed_classifications: Vec<ClassificationFailure>,
    ) -> ActivityPattern {
        let mut directories: HashMap<&str, usize> = HashMap::new();
        let mut extensions: HashMap<&str, usize> = HashMap::new();
        let mut content_counts = BTreeMap::new();

        for record in &records {
            *directories.entry(record.directory()).or_insert(0) += 1;
            *extensions.entry(record.extension()).or_insert(0) += 1;
            if let Some(content_type) = record.content_type() {
                *content_counts.entry(content_type).or_insert(0) += 1;
            }
        }

        let top_directories = rank(directories, self.top_k);
        let top_file_types = rank(extensions, self.top_k);
        let total_changes = records.len();

        let classified_records: Vec<ChangeRecord> = records
            .into_iter()
            .filter(|r| r.classification().is_some())
            .collect();

        debug!(
            total_changes,
            classified = classified_records.len(),
            failed = failed_classifications.len(),
            "aggregated activity"
        );

        ActivityPattern {
            total_changes,
            top_directories,
            top_file_types,
            content_counts,
            classified_records,
            failed_classifications,
        }
    }
}

/// Turn raw paths into records, preserving order.
///
/// # Errors
/// Fails on the first malformed path.
pub fn build_records<S: AsRef<str>>(paths: &[S]) -> Result<Vec<ChangeRecord>> {
    paths
        .iter()
        .map(|p| ChangeRecord::new(p).map_err(Into::into))
        .collect()
}

/// Attach classifications in place, returning the records that failed.
pub fn classify_records(
    records: &mut [ChangeRecord],
    classifier: &dyn ContentClassifier,
) -> Vec<ClassificationFailure> {
    let mut failures = Vec::new();
    for record in records.iter_mut() {
        match classifier.classify(record) {
            Ok(classification) => record.set_classification(classification),
            Err(e) => {
                warn!(path = %record.path(), reason = %e.reason, "classification unavailable");
                failures.push(ClassificationFailure {
                    path: e.path,
                    reason: e.reason,
                });
            }
        }
    }
    failures
}

/// Rank tallies by count descending, then key ascending, keeping `k`.
pub fn rank(counts: HashMap<&str, usize>, k: usize) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = counts
        .into_iter()
        .map(|(key, count)| RankedEntry::new(key, count))
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    entries.truncate(k);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassificationUnavailable;
    use crate::error::ReportError;
    use changewatch_models::{Classification, ContentType};

    /// Classifies by extension and fails for anything under `broken/`.
    struct FakeClassifier;

    impl ContentClassifier for FakeClassifier {
        fn classify(
            &self,
            record: &ChangeRecord,
        ) -> std::result::Result<Classification, ClassificationUnavailable> {
            if record.path().starts_with("broken/") {
                return Err(ClassificationUnavailable::new(record.path(), "fetch timed out"));
            }
            let content_type = match record.extension() {
                "md" => ContentType::Document,
                "rs" => ContentType::Code,
                "csv" => ContentType::Data,
                _ => ContentType::Unknown,
            };
            Ok(Classification::new(content_type, "fake"))
        }
    }

    fn paths_with_counts(counts: &[(&str, usize)]) -> Vec<String> {
        counts
            .iter()
            .flat_map(|(dir, n)| (0..*n).map(move |i| format!("{}/file{}.txt", dir, i)))
            .collect()
    }

    #[test]
    fn test_top_k_with_ties() {
        let paths = paths_with_counts(&[
            ("zeta", 5),
            ("alpha", 5),
            ("mid", 4),
            ("c", 3),
            ("b", 2),
            ("a", 1),
        ]);
        let pattern = ActivityAnalyzer::new(3).analyze(&paths, None).unwrap();

        assert_eq!(pattern.total_changes, 20);
        assert_eq!(
            pattern.top_directories,
            vec![
                RankedEntry::new("alpha", 5),
                RankedEntry::new("zeta", 5),
                RankedEntry::new("mid", 4),
            ]
        );
    }

    #[test]
    fn test_ranking_is_reproducible() {
        let paths = paths_with_counts(&[("d", 2), ("c", 2), ("b", 2), ("a", 2)]);
        let analyzer = ActivityAnalyzer::new(3);
        let first = analyzer.analyze(&paths, None).unwrap();
        let second = analyzer.analyze(&paths, None).unwrap();
        assert_eq!(first.top_directories, second.top_directories);
        assert_eq!(first.top_directories[0].key, "a");
    }

    #[test]
    fn test_duplicates_count_as_occurrences() {
        let paths = ["docs/a.md", "docs/a.md", "docs/a.md"];
        let pattern = ActivityAnalyzer::default().analyze(&paths, None).unwrap();
        assert_eq!(pattern.total_changes, 3);
        assert_eq!(pattern.top_directories, vec![RankedEntry::new("docs", 3)]);
        assert_eq!(pattern.top_file_types, vec![RankedEntry::new("md", 3)]);
    }

    #[test]
    fn test_file_types_include_empty_extension() {
        let paths = ["README", "LICENSE", "notes.md"];
        let pattern = ActivityAnalyzer::default().analyze(&paths, None).unwrap();
        assert_eq!(
            pattern.top_file_types,
            vec![RankedEntry::new("", 2), RankedEntry::new("md", 1)]
        );
        assert_eq!(pattern.top_directories, vec![RankedEntry::new(".", 3)]);
    }

    #[test]
    fn test_invalid_path_aborts() {
        let paths = ["docs/a.md", "  ", "docs/b.md"];
        let err = ActivityAnalyzer::default()
            .analyze(&paths, Some(&FakeClassifier))
            .unwrap_err();
        assert!(matches!(err, ReportError::InvalidRecord(_)));
    }

    #[test]
    fn test_classification_failure_is_isolated() {
        let mut paths: Vec<String> = (0..9).map(|i| format!("docs/note{}.md", i)).collect();
        paths.insert(4, "broken/table.csv".to_string());

        let pattern = ActivityAnalyzer::default()
            .analyze(&paths, Some(&FakeClassifier))
            .unwrap();

        assert_eq!(pattern.total_changes, 10);
        assert_eq!(pattern.classified_records.len(), 9);
        assert!(pattern
            .classified_records
            .iter()
            .all(|r| r.path() != "broken/table.csv"));
        assert_eq!(pattern.failed_classifications.len(), 1);
        assert_eq!(pattern.failed_classifications[0].path, "broken/table.csv");
        assert_eq!(pattern.content_count(ContentType::Data), 0);
        assert_eq!(pattern.content_count(ContentType::Document), 9);
        // The failed record still counts toward rankings.
        assert!(pattern
            .top_directories
            .contains(&RankedEntry::new("broken", 1)));
    }

    #[test]
    fn test_classified_records_keep_input_order() {
        let paths = ["src/b.rs", "docs/a.md", "data/c.csv"];
        let pattern = ActivityAnalyzer::default()
            .analyze(&paths, Some(&FakeClassifier))
            .unwrap();
        let order: Vec<&str> = pattern.classified_records.iter().map(|r| r.path()).collect();
        assert_eq!(order, vec!["src/b.rs", "docs/a.md", "data/c.csv"]);
        assert_eq!(pattern.content_count(ContentType::Code), 1);
    }

    #[test]
    fn test_empty_input() {
        let paths: [&str; 0] = [];
        let pattern = ActivityAnalyzer::default().analyze(&paths, None).unwrap();
        assert!(pattern.is_empty());
        assert!(pattern.top_directories.is_empty());
        assert!(pattern.content_counts.is_empty());
    }
}

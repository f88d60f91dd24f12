//! Report generation: analysis plus rendering for one window.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use changewatch_models::{ActivityPattern, Period, ReportWindow};
use tracing::info;

use crate::analyzer::ActivityAnalyzer;
use crate::classifier::ContentClassifier;
use crate::config::ReportConfig;
use crate::dispatch::ReportMessage;
use crate::error::Result;
use crate::renderer::NarrativeRenderer;

/// A finished report.
#[derive(Debug, Clone)]
pub struct Report {
    /// Window the report covers.
    pub window: ReportWindow,
    /// Statistics the body was rendered from.
    pub pattern: ActivityPattern,
    /// Subject line for delivery.
    pub subject: String,
    /// Rendered narrative.
    pub body: String,
}

impl Report {
    /// Message addressed to the dispatcher's default recipients.
    pub fn to_message(&self) -> ReportMessage {
        ReportMessage::new(self.subject.clone(), self.body.clone())
    }
}

/// Subject line built from the window label and change count.
pub fn compose_subject(window: &ReportWindow, total_changes: usize) -> String {
    let count = match total_changes {
        0 => "no changes".to_string(),
        1 => "1 change".to_string(),
        n => format!("{} changes", n),
    };
    format!("File Activity Report: {} ({})", window.label(), count)
}

/// Turns a window and its raw changes into a [`Report`].
///
/// Output depends only on the inputs and the classifier's responses.
#[derive(Clone, Default)]
pub struct ReportGenerator {
    config: ReportConfig,
    classifier: Option<Arc<dyn ContentClassifier>>,
}

impl ReportGenerator {
    /// Generator without classification.
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            classifier: None,
        }
    }

    /// Generator using the defaults for a period.
    pub fn for_period(period: Period) -> Self {
        Self::new(ReportConfig::for_period(period))
    }

    /// Enables classification.
    pub fn with_classifier(mut self, classifier: Arc<dyn ContentClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn classifier(&self) -> Option<&Arc<dyn ContentClassifier>> {
        self.classifier.as_ref()
    }

    pub fn analyzer(&self) -> ActivityAnalyzer {
        ActivityAnalyzer::from_config(&self.config)
    }

    pub fn renderer(&self) -> NarrativeRenderer {
        NarrativeRenderer::new(self.config.clone())
    }

    /// Analyze and render one window.
    ///
    /// # Errors
    /// Fails only on malformed paths; classification failures are absorbed.
    pub fn generate<S: AsRef<str>>(&self, window: &ReportWindow, raw_changes: &[S]) -> Result<Report> {
        let classifier = self.classifier.as_deref();
        let pattern = self.analyzer().analyze(raw_changes, classifier)?;
        Ok(self.finish(window, pattern))
    }

    /// Same as [`generate`](Self::generate), with a fixed footer timestamp.
    pub fn generate_at<S: AsRef<str>>(
        &self,
        window: &ReportWindow,
        raw_changes: &[S],
        generated_at: DateTime<Utc>,
    ) -> Result<Report> {
        let classifier = self.classifier.as_deref();
        let pattern = self.analyzer().analyze(raw_changes, classifier)?;
        Ok(self.finish_at(window, pattern, generated_at))
    }

    /// Render an already-aggregated pattern.
    pub fn finish(&self, window: &ReportWindow, pattern: ActivityPattern) -> Report {
        self.finish_at(window, pattern, Utc::now())
    }

    /// Render an already-aggregated pattern with a fixed footer timestamp.
    pub fn finish_at(
        &self,
        window: &ReportWindow,
        pattern: ActivityPattern,
        generated_at: DateTime<Utc>,
    ) -> Report {
        let body = self.renderer().render_at(window, &pattern, generated_at);
        let subject = compose_subject(window, pattern.total_changes);

        info!(
            window = %window.label(),
            total_changes = pattern.total_changes,
            classified = pattern.classified_records.len(),
            "generated report"
        );

        Report {
            window: *window,
            pattern,
            subject,
            body,
        }
    }
}

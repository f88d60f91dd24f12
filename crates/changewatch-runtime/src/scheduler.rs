//! Periodic report generation.
//!
//! Each tick resolves exactly one window, reads that window's paths from the
//! change log, classifies them concurrently, and only after every
//! classification has returned aggregates, renders and dispatches.

use std::sync::Arc;
use std::time::Duration;

use changewatch_core::{
    build_records, resolve_window, ContentClassifier, Dispatcher, Report, ReportGenerator,
};
use changewatch_models::{ChangeRecord, ClassificationFailure, Period, ReportWindow};
use changewatch_persistence::ChangeLog;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::{Result, RuntimeError};

/// Classify records with at most `concurrency` classifications in flight.
///
/// Results are put back in input order, so the outcome is the same as
/// classifying sequentially.
pub async fn classify_concurrently(
    records: Vec<ChangeRecord>,
    classifier: Arc<dyn ContentClassifier>,
    concurrency: usize,
) -> Result<(Vec<ChangeRecord>, Vec<ClassificationFailure>)> {
    let total = records.len();
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for (index, record) in records.into_iter().enumerate() {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|e| RuntimeError::Shutdown(e.to_string()))?;
        let classifier = Arc::clone(&classifier);
        tasks.spawn_blocking(move || {
            let _permit = permit;
            let outcome = classifier.classify(&record);
            (index, record, outcome)
        });
    }

    let mut slots: Vec<Option<_>> = (0..total).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let (index, record, outcome) = joined.map_err(|e| RuntimeError::Join(e.to_string()))?;
        slots[index] = Some((record, outcome));
    }

    let mut classified = Vec::with_capacity(total);
    let mut failures = Vec::new();
    for (mut record, outcome) in slots.into_iter().flatten() {
        match outcome {
            Ok(classification) => record.set_classification(classification),
            Err(e) => {
                warn!(path = %record.path(), reason = %e.reason, "classification unavailable");
                failures.push(ClassificationFailure {
                    path: e.path,
                    reason: e.reason,
                });
            }
        }
        classified.push(record);
    }

    Ok((classified, failures))
}

/// [`ReportGenerator::generate`] with classification fanned out.
pub async fn generate_report(
    generator: &ReportGenerator,
    window: &ReportWindow,
    paths: &[String],
    concurrency: usize,
) -> Result<Report> {
    let records = build_records(paths)?;
    let (records, failures) = match generator.classifier() {
        Some(classifier) => {
            classify_concurrently(records, Arc::clone(classifier), concurrency).await?
        }
        None => (records, Vec::new()),
    };
    let pattern = generator.analyzer().aggregate(records, failures);
    Ok(generator.finish(window, pattern))
}

/// Generates and dispatches a report on a fixed interval.
pub struct ReportScheduler {
    log: Arc<ChangeLog>,
    generator: ReportGenerator,
    dispatcher: Arc<dyn Dispatcher>,
    period: Period,
    concurrency: usize,
}

impl ReportScheduler {
    pub fn new(
        log: Arc<ChangeLog>,
        generator: ReportGenerator,
        dispatcher: Arc<dyn Dispatcher>,
        period: Period,
    ) -> Self {
        Self {
            log,
            generator,
            dispatcher,
            period,
            concurrency: 4,
        }
    }

    /// Sets the classification concurrency.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn period(&self) -> Period {
        self.period
    }

    /// Resolve the current window, then report on it.
    pub async fn run_once(&self) -> Result<Report> {
        let window = resolve_window(self.period, None)?;
        self.report_for(&window).await
    }

    /// Build and dispatch the report for a fixed window.
    pub async fn report_for(&self, window: &ReportWindow) -> Result<Report> {
        let paths = self.log.paths_in(window)?;
        debug!(window = %window.label(), changes = paths.len(), "building scheduled report");

        let report = generate_report(&self.generator, window, &paths, self.concurrency).await?;

        let dispatcher = Arc::clone(&self.dispatcher);
        let message = report.to_message();
        tokio::task::spawn_blocking(move || dispatcher.dispatch(&message))
            .await
            .map_err(|e| RuntimeError::Join(e.to_string()))??;

        info!(subject = %report.subject, "dispatched scheduled report");
        Ok(report)
    }

    /// Report every `every` until shutdown. The first report is one interval in.
    pub async fn run(&self, every: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        debug!(
            period = %self.period,
            report_interval_ms = every.as_millis(),
            "starting report scheduler"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_once().await {
                        warn!(error = %e, "scheduled report failed");
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        debug!("scheduler received shutdown signal");
                        break;
                    }
                }
            }
        }

        debug!("report scheduler stopped");
    }
}

#[cfg(test)]
mod tests;

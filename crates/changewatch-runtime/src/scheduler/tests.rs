use super::*;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use changewatch_core::{
    ClassificationUnavailable, DispatchError, HeuristicClassifier, ReportMessage,
};
use changewatch_models::{Classification, ContentType, ObservedChange};
use chrono::{TimeZone, Utc};
use tempfile::tempdir;

/// Sleeps a path-dependent amount so completions arrive out of order.
struct SlowClassifier {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl SlowClassifier {
    fn new() -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

impl ContentClassifier for SlowClassifier {
    fn classify(
        &self,
        record: &ChangeRecord,
    ) -> std::result::Result<Classification, ClassificationUnavailable> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = 25 - (record.path().len() % 5) * 5;
        std::thread::sleep(Duration::from_millis(delay as u64));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if record.path().contains("broken") {
            return Err(ClassificationUnavailable::new(record.path(), "unreadable"));
        }
        Ok(Classification::new(ContentType::Document, record.file_name())
            .with_keywords(vec![record.file_name().to_string()]))
    }
}

#[derive(Default)]
struct RecordingDispatcher {
    sent: Mutex<Vec<ReportMessage>>,
}

impl Dispatcher for RecordingDispatcher {
    fn dispatch(&self, message: &ReportMessage) -> std::result::Result<(), DispatchError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

struct FailingDispatcher;

impl Dispatcher for FailingDispatcher {
    fn dispatch(&self, _message: &ReportMessage) -> std::result::Result<(), DispatchError> {
        Err(DispatchError::Delivery("relay returned 503".to_string()))
    }
}

fn paths() -> Vec<String> {
    vec![
        "notes/a.md".to_string(),
        "notes/bb.md".to_string(),
        "notes/broken.md".to_string(),
        "src/cccc.rs".to_string(),
        "src/d.rs".to_string(),
        "top.txt".to_string(),
        "notes/eeeee.md".to_string(),
    ]
}

#[tokio::test]
async fn test_concurrent_classification_keeps_input_order() {
    let records = build_records(&paths()).unwrap();
    let classifier = Arc::new(SlowClassifier::new());

    let (records, failures) = classify_concurrently(records, classifier.clone(), 3)
        .await
        .unwrap();

    let order: Vec<&str> = records.iter().map(|r| r.path()).collect();
    assert_eq!(order, paths().iter().map(String::as_str).collect::<Vec<_>>());
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].path, "notes/broken.md");
    assert!(records[2].classification().is_none());
    assert!(records[0].classification().is_some());
    assert!(classifier.max_in_flight.load(Ordering::SeqCst) <= 3);
}

#[tokio::test]
async fn test_concurrent_matches_sequential_generation() {
    let until = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
    let window = ReportWindow::new(Period::Day, until - chrono::Duration::hours(24), until).unwrap();
    let generator =
        ReportGenerator::for_period(Period::Day).with_classifier(Arc::new(SlowClassifier::new()));

    let sequential = generator.generate_at(&window, &paths(), until).unwrap();
    let concurrent = generate_report(&generator, &window, &paths(), 4).await.unwrap();

    assert_eq!(sequential.pattern, concurrent.pattern);
    assert_eq!(sequential.subject, concurrent.subject);
}

#[tokio::test]
async fn test_run_once_reports_logged_changes() {
    let dir = tempdir().unwrap();
    let log = Arc::new(ChangeLog::new(dir.path().join("changes.json")));
    let now = Utc::now();
    log.append(&[
        ObservedChange::new("Projects/site/index.html", now - chrono::Duration::minutes(5)),
        ObservedChange::new("Projects/site/style.css", now - chrono::Duration::minutes(3)),
        ObservedChange::new("stale.txt", now - chrono::Duration::hours(3)),
    ])
    .unwrap();

    let dispatcher = Arc::new(RecordingDispatcher::default());
    let scheduler = ReportScheduler::new(
        log,
        ReportGenerator::for_period(Period::Hour).with_classifier(Arc::new(HeuristicClassifier::new())),
        dispatcher.clone(),
        Period::Hour,
    )
    .with_concurrency(2);

    let report = scheduler.run_once().await.unwrap();
    assert_eq!(report.pattern.total_changes, 2);
    assert_eq!(report.subject, "File Activity Report: Past Hour (2 changes)");

    let sent = dispatcher.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].body, report.body);
}

#[tokio::test]
async fn test_quiet_window_still_dispatches() {
    let dir = tempdir().unwrap();
    let log = Arc::new(ChangeLog::new(dir.path().join("changes.json")));
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let scheduler = ReportScheduler::new(
        log,
        ReportGenerator::for_period(Period::TenMin),
        dispatcher.clone(),
        Period::TenMin,
    );

    let report = scheduler.run_once().await.unwrap();
    assert_eq!(report.pattern.total_changes, 0);
    assert!(report.body.trim_end().ends_with(changewatch_core::renderer::QUIET_PERIOD));
    assert_eq!(dispatcher.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_dispatch_failure_is_reported() {
    let dir = tempdir().unwrap();
    let scheduler = ReportScheduler::new(
        Arc::new(ChangeLog::new(dir.path().join("changes.json"))),
        ReportGenerator::for_period(Period::Hour),
        Arc::new(FailingDispatcher),
        Period::Hour,
    );

    assert!(matches!(
        scheduler.run_once().await,
        Err(RuntimeError::Dispatch(DispatchError::Delivery(_)))
    ));
}

#[tokio::test]
async fn test_custom_period_needs_explicit_window() {
    let dir = tempdir().unwrap();
    let scheduler = ReportScheduler::new(
        Arc::new(ChangeLog::new(dir.path().join("changes.json"))),
        ReportGenerator::for_period(Period::Custom),
        Arc::new(RecordingDispatcher::default()),
        Period::Custom,
    );

    assert!(matches!(scheduler.run_once().await, Err(RuntimeError::Report(_))));
}

#[tokio::test]
async fn test_scheduler_stops_on_shutdown() {
    let dir = tempdir().unwrap();
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let scheduler = ReportScheduler::new(
        Arc::new(ChangeLog::new(dir.path().join("changes.json"))),
        ReportGenerator::for_period(Period::TenMin),
        dispatcher.clone(),
        Period::TenMin,
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let handle = tokio::spawn(async move {
        scheduler.run(Duration::from_millis(20), shutdown_rx).await;
    });

    tokio::time::sleep(Duration::from_millis(70)).await;
    shutdown_tx.send(true).unwrap();

    let result = tokio::time::timeout(Duration::from_millis(500), handle).await;
    assert!(result.is_ok(), "scheduler should stop after shutdown signal");
    assert!(!dispatcher.sent.lock().unwrap().is_empty());
}

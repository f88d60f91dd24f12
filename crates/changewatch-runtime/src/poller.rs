//! Change poller feeding the change log.

use std::sync::Arc;
use std::time::Duration;

use changewatch_core::ChangeSink;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::source::ChangeSource;

/// Pulls a change source on a fixed interval and records what it returns.
pub struct ChangePoller {
    source: Arc<dyn ChangeSource>,
    sink: Arc<dyn ChangeSink>,
    shutdown: watch::Receiver<bool>,
}

impl ChangePoller {
    /// Creates a new change poller.
    pub fn new(
        source: Arc<dyn ChangeSource>,
        sink: Arc<dyn ChangeSink>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            source,
            sink,
            shutdown,
        }
    }

    /// Pull once and record the result. Returns how many changes were new.
    pub async fn poll_once(&self) -> Result<usize> {
        let changes = self.source.poll().await?;
        if changes.is_empty() {
            return Ok(0);
        }
        let added = self.sink.record(&changes)?;
        if added > 0 {
            info!(source = self.source.name(), added, "recorded changes");
        }
        Ok(added)
    }

    /// Run the polling loop until shutdown signal.
    pub async fn run(&mut self, poll_interval: Duration) {
        let mut ticker = interval(poll_interval);

        debug!(
            source = self.source.name(),
            poll_interval_ms = poll_interval.as_millis(),
            "starting change poller"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.poll_once().await {
                        warn!(source = self.source.name(), error = %e, "poll failed");
                    }
                }
                _ = self.shutdown.changed() => {
                    if *self.shutdown.borrow() {
                        debug!("poller received shutdown signal");
                        break;
                    }
                }
            }
        }

        debug!("change poller stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use changewatch_core::SinkError;
    use changewatch_models::ObservedChange;
    use chrono::Utc;

    use crate::error::RuntimeError;

    /// Hands out queued batches, then nothing.
    struct QueueSource {
        batches: Mutex<Vec<Result<Vec<ObservedChange>>>>,
    }

    impl QueueSource {
        fn new(batches: Vec<Result<Vec<ObservedChange>>>) -> Self {
            let mut batches = batches;
            batches.reverse();
            Self {
                batches: Mutex::new(batches),
            }
        }
    }

    #[async_trait]
    impl ChangeSource for QueueSource {
        fn name(&self) -> &str {
            "queue"
        }

        async fn poll(&self) -> Result<Vec<ObservedChange>> {
            self.batches.lock().unwrap().pop().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    #[derive(Default)]
    struct MemorySink {
        recorded: Mutex<Vec<ObservedChange>>,
    }

    impl ChangeSink for MemorySink {
        fn record(&self, changes: &[ObservedChange]) -> std::result::Result<usize, SinkError> {
            let mut recorded = self.recorded.lock().unwrap();
            recorded.extend_from_slice(changes);
            Ok(changes.len())
        }
    }

    #[tokio::test]
    async fn test_poll_once_records_batch() {
        let now = Utc::now();
        let source = Arc::new(QueueSource::new(vec![Ok(vec![
            ObservedChange::new("a.md", now),
            ObservedChange::new("b.md", now),
        ])]));
        let sink = Arc::new(MemorySink::default());
        let (_tx, rx) = watch::channel(false);

        let poller = ChangePoller::new(source, sink.clone(), rx);
        assert_eq!(poller.poll_once().await.unwrap(), 2);
        assert_eq!(poller.poll_once().await.unwrap(), 0);
        assert_eq!(sink.recorded.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_source_error_propagates_from_poll_once() {
        let source = Arc::new(QueueSource::new(vec![Err(RuntimeError::Source(
            "listing API error 401".to_string(),
        ))]));
        let (_tx, rx) = watch::channel(false);
        let poller = ChangePoller::new(source, Arc::new(MemorySink::default()), rx);

        assert!(matches!(
            poller.poll_once().await,
            Err(RuntimeError::Source(_))
        ));
    }

    #[tokio::test]
    async fn test_poller_survives_errors_and_stops_on_shutdown() {
        let now = Utc::now();
        let source = Arc::new(QueueSource::new(vec![
            Err(RuntimeError::Source("temporary".to_string())),
            Ok(vec![ObservedChange::new("late.txt", now)]),
        ]));
        let sink = Arc::new(MemorySink::default());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut poller = ChangePoller::new(source, sink.clone(), shutdown_rx);
        let handle = tokio::spawn(async move {
            poller.run(Duration::from_millis(10)).await;
        });

        tokio::time::sleep(Duration::from_millis(80)).await;
        shutdown_tx.send(true).unwrap();

        let result = tokio::time::timeout(Duration::from_millis(200), handle).await;
        assert!(result.is_ok(), "poller should stop after shutdown signal");
        assert_eq!(sink.recorded.lock().unwrap().len(), 1);
    }
}

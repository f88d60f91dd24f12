//! Main runtime manager.

use std::sync::Arc;

use changewatch_core::{ChangeSink, Dispatcher, ReportGenerator};
use changewatch_persistence::ChangeLog;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::poller::ChangePoller;
use crate::scheduler::ReportScheduler;
use crate::source::ChangeSource;

/// Runs the change poller and the report scheduler side by side.
pub struct Runtime {
    config: RuntimeConfig,
    source: Arc<dyn ChangeSource>,
    log: Arc<ChangeLog>,
    scheduler: Arc<ReportScheduler>,
    /// Handles to the poller and scheduler tasks.
    handles: Vec<JoinHandle<()>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    started: bool,
}

impl Runtime {
    /// Create a runtime. The generator decides thresholds and classification;
    /// the report period and concurrency come from `config`.
    pub fn new(
        config: RuntimeConfig,
        source: Arc<dyn ChangeSource>,
        log: Arc<ChangeLog>,
        generator: ReportGenerator,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        let scheduler = ReportScheduler::new(
            Arc::clone(&log),
            generator,
            dispatcher,
            config.report_period,
        )
        .with_concurrency(config.classify_concurrency);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            config,
            source,
            log,
            scheduler: Arc::new(scheduler),
            handles: Vec::new(),
            shutdown_tx,
            shutdown_rx,
            started: false,
        }
    }

    /// Start polling and scheduled reporting.
    pub async fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(RuntimeError::AlreadyStarted);
        }

        info!(
            source = self.source.name(),
            period = %self.config.report_period,
            "starting runtime"
        );

        let mut poller = ChangePoller::new(
            Arc::clone(&self.source),
            Arc::clone(&self.log) as Arc<dyn ChangeSink>,
            self.shutdown_rx.clone(),
        );
        let poll_interval = self.config.poll_interval;
        self.handles.push(tokio::spawn(async move {
            poller.run(poll_interval).await;
        }));

        let scheduler = Arc::clone(&self.scheduler);
        let report_interval = self.config.report_interval;
        let shutdown_rx = self.shutdown_rx.clone();
        self.handles.push(tokio::spawn(async move {
            scheduler.run(report_interval, shutdown_rx).await;
        }));

        self.started = true;
        debug!("runtime started");
        Ok(())
    }

    /// Stop both loops and wait for them to finish.
    pub async fn shutdown(&mut self) -> Result<()> {
        if !self.started {
            return Err(RuntimeError::NotStarted);
        }

        info!("shutting down runtime");

        self.shutdown_tx.send(true).map_err(|e| {
            RuntimeError::Shutdown(format!("failed to send shutdown signal: {}", e))
        })?;

        for handle in self.handles.drain(..) {
            handle
                .await
                .map_err(|e| RuntimeError::Shutdown(format!("task panicked: {}", e)))?;
        }

        self.started = false;
        info!("runtime stopped");
        Ok(())
    }

    /// Scheduler, for on-demand reports.
    pub fn scheduler(&self) -> Arc<ReportScheduler> {
        Arc::clone(&self.scheduler)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Check if the runtime has been started.
    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        if self.started {
            let _ = self.shutdown_tx.send(true);
        }
    }
}

//! Command handlers for CLI subcommands.

use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use changewatch_core::{
    config, resolve_window, ContentClassifier, Dispatcher, HeuristicClassifier, LocalFetcher,
    ReportConfig, ReportGenerator,
};
use changewatch_models::{ObservedChange, Period};
use changewatch_persistence::{ChangeLog, CursorStore, Outbox};
use changewatch_runtime::{
    ChangeSource, ListFolderSource, RemoteFetcher, Runtime, RuntimeConfig, WebhookDispatcher,
};
use tracing::{info, warn};

use crate::cli::{Commands, OutputFormat};

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Execute a CLI command.
pub fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::Report {
            period,
            since,
            mirror,
            remote,
            no_classify,
            top_k,
            send,
            format,
        } => {
            let classifier = build_classifier(mirror.as_deref(), remote, no_classify)?;
            cmd_report(period, since, classifier, top_k, send, format)
        }
        Commands::Ingest { paths } => cmd_ingest(paths),
        Commands::Poll { root, initial } => cmd_poll(&root, initial),
        Commands::Run {
            period,
            poll_secs,
            report_secs,
            concurrency,
            root,
            mirror,
            no_classify,
        } => {
            let classifier = build_classifier(mirror.as_deref(), false, no_classify)?;
            let config = RuntimeConfig::new()
                .with_report_period(period)
                .with_poll_interval(Duration::from_secs(poll_secs.max(1)))
                .with_report_interval(report_interval(period, report_secs))
                .with_classify_concurrency(concurrency);
            cmd_run(config, &root, classifier)
        }
        Commands::Window { period, since } => cmd_window(period, since),
    }
}

/// Default report interval: one period, or an hour for custom windows.
fn report_interval(period: Period, override_secs: Option<u64>) -> Duration {
    if let Some(secs) = override_secs {
        return Duration::from_secs(secs.max(1));
    }
    period
        .lookback()
        .and_then(|d| d.to_std().ok())
        .unwrap_or(Duration::from_secs(3600))
}

fn change_log() -> ChangeLog {
    ChangeLog::new(config::changes_file())
}

fn storage_token() -> Result<String> {
    std::env::var(config::STORAGE_TOKEN_ENV)
        .ok()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| format!("{} is not set", config::STORAGE_TOKEN_ENV).into())
}

/// Relay dispatcher when a URL is configured, otherwise the local outbox.
fn build_dispatcher() -> Arc<dyn Dispatcher> {
    let recipients = config::default_recipients();
    match std::env::var(config::WEBHOOK_URL_ENV) {
        Ok(url) if !url.trim().is_empty() => {
            Arc::new(WebhookDispatcher::new(url.trim()).with_default_recipients(recipients))
        }
        _ => Arc::new(Outbox::new(config::outbox_dir()).with_default_recipients(recipients)),
    }
}

fn build_classifier(
    mirror: Option<&str>,
    remote: bool,
    no_classify: bool,
) -> Result<Option<Arc<dyn ContentClassifier>>> {
    if no_classify {
        return Ok(None);
    }
    if let Some(mirror) = mirror {
        let root = PathBuf::from(shellexpand::tilde(mirror).to_string());
        if !root.is_dir() {
            return Err(format!("Mirror is not a directory: {}", root.display()).into());
        }
        let fetcher = Arc::new(LocalFetcher::new(root));
        return Ok(Some(Arc::new(HeuristicClassifier::with_fetcher(fetcher))));
    }
    if remote {
        let fetcher = Arc::new(RemoteFetcher::new(storage_token()?));
        return Ok(Some(Arc::new(HeuristicClassifier::with_fetcher(fetcher))));
    }
    Ok(Some(Arc::new(HeuristicClassifier::new())))
}

fn cmd_report(
    period: Period,
    since: Option<DateTime<Utc>>,
    classifier: Option<Arc<dyn ContentClassifier>>,
    top_k: Option<usize>,
    send: bool,
    format: OutputFormat,
) -> Result<()> {
    let window = resolve_window(period, since)?;
    let paths = change_log().paths_in(&window)?;

    let mut report_config = ReportConfig::for_period(period);
    if let Some(k) = top_k {
        report_config = report_config.with_top_k(k);
    }
    let mut generator = ReportGenerator::new(report_config);
    if let Some(classifier) = classifier {
        generator = generator.with_classifier(classifier);
    }

    let report = generator.generate(&window, &paths)?;

    match format {
        OutputFormat::Text => print!("{}", report.body),
        OutputFormat::Json => {
            let json = serde_json::json!({
                "window": report.window,
                "subject": report.subject,
                "pattern": report.pattern,
                "body": report.body,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    if send {
        build_dispatcher().dispatch(&report.to_message())?;
        info!(subject = %report.subject, "Report dispatched");
        eprintln!("Report dispatched: {}", report.subject);
    }

    Ok(())
}

/// Non-empty trimmed lines.
pub fn read_paths<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut paths = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            paths.push(trimmed.to_string());
        }
    }
    Ok(paths)
}

fn cmd_ingest(paths: Vec<String>) -> Result<()> {
    let paths = if paths.is_empty() {
        let stdin = io::stdin();
        if stdin.is_terminal() {
            eprintln!("Reading paths from stdin, one per line (Ctrl-D to finish)");
        }
        read_paths(stdin.lock())?
    } else {
        paths
    };

    let now = Utc::now();
    let changes: Vec<ObservedChange> = paths
        .into_iter()
        .map(|p| ObservedChange::new(p, now))
        .collect();

    let added = change_log().append(&changes)?;
    println!("Recorded {} of {} changes", added, changes.len());
    Ok(())
}

fn list_folder_source(root: &str, initial: bool) -> Result<ListFolderSource> {
    let cursors = Arc::new(CursorStore::new(config::cursor_file()));
    Ok(ListFolderSource::new(storage_token()?, root, cursors).with_initial_listing(initial))
}

fn cmd_poll(root: &str, initial: bool) -> Result<()> {
    let source = list_folder_source(root, initial)?;
    let runtime = tokio::runtime::Runtime::new()?;
    let changes = runtime.block_on(source.poll())?;

    let added = change_log().append(&changes)?;
    println!("Listing returned {} changes, {} new", changes.len(), added);
    Ok(())
}

fn cmd_run(
    config: RuntimeConfig,
    root: &str,
    classifier: Option<Arc<dyn ContentClassifier>>,
) -> Result<()> {
    config::ensure_all_dirs()?;

    let source = Arc::new(list_folder_source(root, false)?);
    let log = Arc::new(change_log().with_retention(config.retention));
    let mut generator = ReportGenerator::for_period(config.report_period);
    if let Some(classifier) = classifier {
        generator = generator.with_classifier(classifier);
    }

    let tokio_runtime = tokio::runtime::Runtime::new()?;
    tokio_runtime.block_on(async move {
        let mut runtime = Runtime::new(config, source, log, generator, build_dispatcher());
        runtime.start().await?;
        println!("Watching for changes. Press Ctrl-C to stop.");

        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
        }

        runtime.shutdown().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

fn cmd_window(period: Period, since: Option<DateTime<Utc>>) -> Result<()> {
    let window = resolve_window(period, since)?;
    println!("{}", window.label());
    println!("  since: {}", window.since().to_rfc3339());
    println!("  until: {}", window.until().to_rfc3339());
    Ok(())
}

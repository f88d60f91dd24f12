//! changewatch core - activity aggregation and narrative reporting.
//!
//! This crate turns a window's worth of raw file-change paths into a
//! human-readable report:
//!
//! - **window**: Resolve a period token into a fixed `[since, until)` window
//! - **analyzer**: Build records, tally and rank directories and file types
//! - **classifier**: Pluggable content classification with a heuristic default
//! - **renderer**: Multi-section narrative text
//! - **report**: `ReportGenerator` tying the above together
//! - **dispatch**: Capability traits for delivery and change persistence
//! - **config**: Shared paths, environment keys, and report tunables

pub mod analyzer;
pub mod classifier;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod renderer;
pub mod report;
pub mod window;

pub use analyzer::{build_records, classify_records, rank, ActivityAnalyzer};
pub use classifier::{
    ClassificationUnavailable, ContentClassifier, ContentFetcher, FetchError, HeuristicClassifier,
    LocalFetcher,
};
pub use config::ReportConfig;
pub use dispatch::{ChangeSink, DispatchError, Dispatcher, ReportMessage, SinkError};
pub use error::{ReportError, Result};
pub use renderer::{Intensity, NarrativeRenderer};
pub use report::{compose_subject, Report, ReportGenerator};
pub use window::{resolve as resolve_window, resolve_at as resolve_window_at};

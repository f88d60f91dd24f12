//! Async runtime for changewatch.
//!
//! This crate keeps the change log fed and reports flowing:
//! - `ChangeSource` - anything that can say what changed since last asked
//! - `ListFolderSource` - cursor-based listing of a remote storage folder
//! - `ChangePoller` - pulls a source on an interval into the change log
//! - `ReportScheduler` - resolves a window, classifies concurrently, renders
//!   and dispatches on an interval
//! - `Runtime` - main entry point running the poller and scheduler together
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use changewatch_core::ReportGenerator;
//! use changewatch_persistence::{ChangeLog, CursorStore, Outbox};
//! use changewatch_runtime::{ListFolderSource, Runtime, RuntimeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RuntimeConfig::default();
//!     let cursors = Arc::new(CursorStore::new("state/cursor.json"));
//!     let source = Arc::new(ListFolderSource::new("token", "", cursors));
//!     let log = Arc::new(ChangeLog::new("state/changes.json"));
//!     let outbox = Arc::new(Outbox::new("outbox"));
//!
//!     let mut runtime = Runtime::new(
//!         config.clone(),
//!         source,
//!         log,
//!         ReportGenerator::for_period(config.report_period),
//!         outbox,
//!     );
//!     runtime.start().await?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     runtime.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod fetcher;
pub mod poller;
pub mod remote;
pub mod runtime;
pub mod scheduler;
pub mod source;
pub mod webhook;

pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use fetcher::RemoteFetcher;
pub use poller::ChangePoller;
pub use remote::{parse_page, ListFolderSource, ListPage};
pub use runtime::Runtime;
pub use scheduler::{classify_concurrently, generate_report, ReportScheduler};
pub use source::ChangeSource;
pub use webhook::WebhookDispatcher;

//! Persistence layer for changewatch.
//!
//! This crate provides crash-safe persistence for changewatch state using
//! atomic file operations (write to temp file, then rename).
//!
//! - `ChangeLog` - deduplicated log of observed changes, pruned by age
//! - `CursorStore` - continuation cursor for the remote listing
//! - `Outbox` - file-backed report dispatcher
//!
//! # Example
//!
//! ```no_run
//! use changewatch_persistence::ChangeLog;
//! use changewatch_models::ObservedChange;
//! use chrono::Utc;
//!
//! let log = ChangeLog::new("/home/user/.changewatch/state/changes.json");
//!
//! let added = log.append(&[ObservedChange::new("docs/plan.md", Utc::now())]).unwrap();
//! assert_eq!(added, 1);
//! ```

pub mod atomic;
pub mod change_log;
pub mod cursor;
pub mod error;
pub mod outbox;

pub use change_log::ChangeLog;
pub use cursor::CursorStore;
pub use error::{PersistenceError, Result};
pub use outbox::{Outbox, OutboxEntry};

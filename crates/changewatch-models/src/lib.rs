//! Core data models for changewatch.
//!
//! This crate provides the plain data types shared by every changewatch
//! crate: change records and their classification, the aggregated activity
//! pattern, report windows, and the raw observed-change tuples handed to
//! persistence.

pub mod change;
pub mod error;
pub mod pattern;
pub mod record;
pub mod window;

// Re-export main types
pub use change::{ChangeMetadata, ObservedChange};
pub use error::{RecordError, WindowError};
pub use pattern::{ActivityPattern, ClassificationFailure, RankedEntry};
pub use record::{Classification, ChangeRecord, ContentType, DEFAULT_TOPIC, TOP_LEVEL_DIR};
pub use window::{Period, ReportWindow};

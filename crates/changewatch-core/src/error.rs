//! Error types for report generation.

use changewatch_models::{RecordError, WindowError};
use thiserror::Error;

/// Errors that abort report generation.
///
/// Per-record classification problems are not in here: they are absorbed by
/// the analyzer and surface only as missing content sections.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A raw change could not be turned into a record.
    #[error(transparent)]
    InvalidRecord(#[from] RecordError),

    /// The requested window could not be resolved.
    #[error(transparent)]
    InvalidWindow(#[from] WindowError),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

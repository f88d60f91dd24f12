//! Error types for the runtime crate.

use changewatch_core::{DispatchError, ReportError, SinkError};
use changewatch_persistence::PersistenceError;
use thiserror::Error;

/// Errors that can occur in the runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Report generation failed.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Reading or writing local state failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Report delivery failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Recording changes failed.
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// The change source could not be read.
    #[error("change source error: {0}")]
    Source(String),

    /// Runtime not started.
    #[error("runtime not started")]
    NotStarted,

    /// Runtime already started.
    #[error("runtime already started")]
    AlreadyStarted,

    /// Shutdown error.
    #[error("shutdown error: {0}")]
    Shutdown(String),

    /// A background task panicked or was cancelled.
    #[error("task failed: {0}")]
    Join(String),
}

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;

//! Collaborator capabilities: report delivery and change persistence.
//!
//! The engine never talks to a mail server or a database directly. It hands
//! finished messages to a [`Dispatcher`] and raw change tuples to a
//! [`ChangeSink`]; implementations live in the persistence and runtime crates.

use chrono::{DateTime, Utc};
use changewatch_models::ObservedChange;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while delivering a report.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No explicit or default recipients were available.
    #[error("no recipients configured")]
    NoRecipients,

    /// The transport rejected or failed to send the message.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Errors that can occur while persisting changes.
#[derive(Debug, Error)]
#[error("failed to persist change: {0}")]
pub struct SinkError(pub String);

/// A rendered report ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMessage {
    /// Unique message ID.
    pub id: String,
    /// Explicit recipients; `None` means the dispatcher's defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipients: Option<Vec<String>>,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// When the message was created.
    pub created_at: DateTime<Utc>,
}

impl ReportMessage {
    /// Creates a message addressed to the dispatcher's default recipients.
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            recipients: None,
            subject: subject.into(),
            body: body.into(),
            created_at: Utc::now(),
        }
    }

    /// Addresses the message to explicit recipients.
    pub fn to(mut self, recipients: Vec<String>) -> Self {
        self.recipients = Some(recipients);
        self
    }

    /// Explicit recipients if given, otherwise `defaults`.
    ///
    /// # Errors
    /// Returns [`DispatchError::NoRecipients`] if both are empty.
    pub fn resolve_recipients(&self, defaults: &[String]) -> Result<Vec<String>, DispatchError> {
        let resolved = match &self.recipients {
            Some(explicit) if !explicit.is_empty() => explicit.clone(),
            _ => defaults.to_vec(),
        };
        if resolved.is_empty() {
            return Err(DispatchError::NoRecipients);
        }
        Ok(resolved)
    }
}

/// Delivers rendered reports.
pub trait Dispatcher: Send + Sync {
    /// Deliver one message. Only success or failure is reported back.
    fn dispatch(&self, message: &ReportMessage) -> Result<(), DispatchError>;
}

/// Durable store for observed changes.
pub trait ChangeSink: Send + Sync {
    /// Persist a batch, returning how many were new.
    fn record(&self, changes: &[ObservedChange]) -> Result<usize, SinkError>;
}

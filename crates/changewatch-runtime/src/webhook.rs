//! HTTP relay dispatcher.

use std::time::Duration;

use changewatch_core::{DispatchError, Dispatcher, ReportMessage};
use serde::Serialize;
use tracing::info;

/// JSON body posted to the relay.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct WebhookPayload<'a> {
    pub to: Vec<String>,
    pub subject: &'a str,
    pub text: &'a str,
}

/// Delivers reports by POSTing them to a mail relay or chat webhook.
#[derive(Debug, Clone)]
pub struct WebhookDispatcher {
    url: String,
    default_recipients: Vec<String>,
    timeout: Duration,
}

impl WebhookDispatcher {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            default_recipients: Vec::new(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Recipients used when a message names none.
    pub fn with_default_recipients(mut self, recipients: Vec<String>) -> Self {
        self.default_recipients = recipients;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Body that would be sent for `message`.
    pub fn payload<'a>(&self, message: &'a ReportMessage) -> Result<WebhookPayload<'a>, DispatchError> {
        Ok(WebhookPayload {
            to: message.resolve_recipients(&self.default_recipients)?,
            subject: &message.subject,
            text: &message.body,
        })
    }
}

impl Dispatcher for WebhookDispatcher {
    fn dispatch(&self, message: &ReportMessage) -> Result<(), DispatchError> {
        let payload = self.payload(message)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| DispatchError::Delivery(e.to_string()))?;

        let response = client
            .post(&self.url)
            .json(&payload)
            .send()
            .map_err(|e| DispatchError::Delivery(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DispatchError::Delivery(format!(
                "relay returned {}",
                response.status()
            )));
        }

        info!(id = %message.id, recipients = payload.to.len(), "Delivered report");
        Ok(())
    }
}

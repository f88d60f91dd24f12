//! Remote storage account listing.
//!
//! Talks to a Dropbox-style `files/list_folder` API: the first call lists the
//! watched folder and returns a cursor, later calls pass the cursor to
//! `list_folder/continue` and get only what changed since.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use changewatch_models::{ChangeMetadata, ObservedChange};
use changewatch_persistence::CursorStore;
use serde::Deserialize;
use tracing::{debug, info, trace};

use crate::error::{Result, RuntimeError};
use crate::source::ChangeSource;

/// Default API base for listing calls.
pub const DEFAULT_API_BASE: &str = "https://api.dropboxapi.com/2";

/// One page of a folder listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage {
    pub changes: Vec<ObservedChange>,
    pub cursor: String,
    pub has_more: bool,
}

#[derive(Debug, Deserialize)]
struct ListFolderResponse {
    #[serde(default)]
    entries: Vec<ListEntry>,
    cursor: String,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = ".tag", rename_all = "snake_case")]
enum ListEntry {
    File {
        path_display: Option<String>,
        path_lower: Option<String>,
        rev: Option<String>,
        size: Option<u64>,
        server_modified: Option<DateTime<Utc>>,
    },
    Deleted {
        path_display: Option<String>,
        path_lower: Option<String>,
    },
    Folder {},
    #[serde(other)]
    Other,
}

fn entry_path(display: Option<String>, lower: Option<String>) -> Option<String> {
    display
        .or(lower)
        .map(|p| p.trim_start_matches('/').to_string())
        .filter(|p| !p.is_empty())
}

/// Parse one listing response body into changes.
///
/// File entries become changes carrying their revision; deleted entries
/// become changes flagged as deletions; folders are skipped.
pub fn parse_page(body: &str, observed_at: DateTime<Utc>) -> serde_json::Result<ListPage> {
    let response: ListFolderResponse = serde_json::from_str(body)?;

    let changes = response
        .entries
        .into_iter()
        .filter_map(|entry| match entry {
            ListEntry::File {
                path_display,
                path_lower,
                rev,
                size,
                server_modified,
            } => entry_path(path_display, path_lower).map(|path| {
                ObservedChange::new(path, observed_at).with_metadata(ChangeMetadata {
                    rev,
                    size,
                    server_modified,
                    deleted: false,
                })
            }),
            ListEntry::Deleted {
                path_display,
                path_lower,
            } => entry_path(path_display, path_lower).map(|path| {
                ObservedChange::new(path, observed_at).with_metadata(ChangeMetadata {
                    deleted: true,
                    ..Default::default()
                })
            }),
            ListEntry::Folder {} | ListEntry::Other => None,
        })
        .collect();

    Ok(ListPage {
        changes,
        cursor: response.cursor,
        has_more: response.has_more,
    })
}

/// Change source backed by the remote listing API.
pub struct ListFolderSource {
    client: reqwest::Client,
    api_base: String,
    token: String,
    root: String,
    cursors: Arc<CursorStore>,
    report_initial_listing: bool,
}

impl ListFolderSource {
    /// Creates a source watching `root` with a bearer `token`.
    pub fn new(token: impl Into<String>, root: impl Into<String>, cursors: Arc<CursorStore>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            token: token.into(),
            root: root.into(),
            cursors,
            report_initial_listing: false,
        }
    }

    /// Overrides the API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Report every file of the first listing as a change.
    ///
    /// Off by default: the first listing only establishes the cursor.
    pub fn with_initial_listing(mut self, report: bool) -> Self {
        self.report_initial_listing = report;
        self
    }

    async fn call(&self, endpoint: &str, body: serde_json::Value) -> Result<ListPage> {
        let url = format!("{}/files/{}", self.api_base, endpoint);
        trace!(url = %url, "listing request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&body)
            .send()
            .await
            .map_err(|e| RuntimeError::Source(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(RuntimeError::Source(format!(
                "listing API error {}: {}",
                status, text
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| RuntimeError::Source(e.to_string()))?;
        parse_page(&text, Utc::now()).map_err(|e| RuntimeError::Source(e.to_string()))
    }
}

#[async_trait]
impl ChangeSource for ListFolderSource {
    fn name(&self) -> &str {
        "list_folder"
    }

    async fn poll(&self) -> Result<Vec<ObservedChange>> {
        let stored = self.cursors.load()?;
        let initial = stored.is_none();

        let mut page = match stored {
            Some(cursor) => {
                self.call("list_folder/continue", serde_json::json!({ "cursor": cursor }))
                    .await?
            }
            None => {
                info!(root = %self.root, "no cursor stored, listing folder");
                self.call(
                    "list_folder",
                    serde_json::json!({
                        "path": self.root,
                        "recursive": true,
                        "include_deleted": true,
                    }),
                )
                .await?
            }
        };

        let mut changes = std::mem::take(&mut page.changes);
        while page.has_more {
            page = self
                .call("list_folder/continue", serde_json::json!({ "cursor": page.cursor }))
                .await?;
            changes.append(&mut page.changes);
        }

        self.cursors.save(&page.cursor)?;

        if initial && !self.report_initial_listing {
            debug!(entries = changes.len(), "initial listing recorded as baseline");
            return Ok(Vec::new());
        }

        debug!(changes = changes.len(), "listing returned changes");
        Ok(changes)
    }
}

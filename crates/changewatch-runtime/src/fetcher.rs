//! Content samples downloaded from the storage account.

use std::time::Duration;

use changewatch_core::{ContentFetcher, FetchError};
use reqwest::StatusCode;

/// Default content download endpoint.
pub const DEFAULT_CONTENT_URL: &str = "https://content.dropboxapi.com/2/files/download";

/// Downloads the first bytes of a file for classification.
///
/// Uses a blocking client: the classifier is synchronous and the scheduler
/// runs it on the blocking pool.
#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    url: String,
    token: String,
    timeout: Duration,
}

impl RemoteFetcher {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            url: DEFAULT_CONTENT_URL.to_string(),
            token: token.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Overrides the download URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Value of the API argument header selecting `path`.
pub fn api_arg(path: &str) -> String {
    let path = format!("/{}", path.trim_start_matches('/'));
    serde_json::json!({ "path": path }).to_string()
}

/// Value of the `Range` header for the first `max_bytes` bytes.
pub fn byte_range(max_bytes: usize) -> String {
    format!("bytes=0-{}", max_bytes.saturating_sub(1))
}

impl ContentFetcher for RemoteFetcher {
    fn fetch_sample(&self, path: &str, max_bytes: usize) -> Result<String, FetchError> {
        let remote = |reason: String| FetchError::Remote {
            path: path.to_string(),
            reason,
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| remote(e.to_string()))?;

        let response = client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Dropbox-API-Arg", api_arg(path))
            .header("Range", byte_range(max_bytes))
            .send()
            .map_err(|e| remote(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND | StatusCode::CONFLICT => {
                return Err(FetchError::NotFound(path.to_string()))
            }
            status => return Err(remote(format!("download returned {}", status))),
        }

        let bytes = response.bytes().map_err(|e| remote(e.to_string()))?;
        let sample = &bytes[..bytes.len().min(max_bytes)];
        Ok(String::from_utf8_lossy(sample).into_owned())
    }
}

//! Continuation cursor for the remote listing.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::atomic::{atomic_write_json, read_json_optional, remove_if_exists};
use crate::error::Result;

#[derive(Debug, Serialize, Deserialize)]
struct CursorFile {
    cursor: String,
    updated_at: DateTime<Utc>,
}

/// Persists the listing cursor so a restart resumes where it left off.
#[derive(Debug, Clone)]
pub struct CursorStore {
    path: PathBuf,
}

impl CursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Stored cursor, if any.
    pub fn load(&self) -> Result<Option<String>> {
        Ok(read_json_optional::<CursorFile>(&self.path)?.map(|f| f.cursor))
    }

    /// Replace the stored cursor.
    pub fn save(&self, cursor: &str) -> Result<()> {
        atomic_write_json(
            &self.path,
            &CursorFile {
                cursor: cursor.to_string(),
                updated_at: Utc::now(),
            },
        )
    }

    /// Forget the cursor, forcing a full listing next time.
    pub fn clear(&self) -> Result<()> {
        remove_if_exists(&self.path)
    }
}

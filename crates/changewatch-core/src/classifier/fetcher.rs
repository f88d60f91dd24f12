//! Content fetchers supplying text samples to the classifier.

use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while fetching a content sample.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The file does not exist at the source.
    #[error("not found: {0}")]
    NotFound(String),

    /// Local I/O failure.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The path would resolve outside the mirror root.
    #[error("path escapes the mirror root: {0}")]
    OutsideRoot(String),

    /// Remote fetch failure.
    #[error("remote fetch failed for {path}: {reason}")]
    Remote { path: String, reason: String },
}

/// Source of file content samples.
pub trait ContentFetcher: Send + Sync {
    /// Fetch up to `max_bytes` of the file at `path` as text.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    fn fetch_sample(&self, path: &str, max_bytes: usize) -> Result<String, FetchError>;
}

/// Reads samples from a local mirror of the storage account.
#[derive(Debug, Clone)]
pub struct LocalFetcher {
    root: PathBuf,
}

impl LocalFetcher {
    /// Creates a fetcher rooted at a local directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Mirror root.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl ContentFetcher for LocalFetcher {
    fn fetch_sample(&self, path: &str, max_bytes: usize) -> Result<String, FetchError> {
        let relative = Path::new(path.trim_start_matches('/'));
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(FetchError::OutsideRoot(path.to_string()));
        }

        let io_err = |source: std::io::Error| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FetchError::NotFound(path.to_string())
            } else {
                FetchError::Io {
                    path: path.to_string(),
                    source,
                }
            }
        };

        // Symlinks inside the mirror may still point elsewhere
        let root = self.root.canonicalize().map_err(io_err)?;
        let full = root.join(relative).canonicalize().map_err(io_err)?;
        if !full.starts_with(&root) {
            return Err(FetchError::OutsideRoot(path.to_string()));
        }

        let file = File::open(&full).map_err(io_err)?;

        let mut buf = Vec::with_capacity(max_bytes.min(64 * 1024));
        file.take(max_bytes as u64)
            .read_to_end(&mut buf)
            .map_err(|source| FetchError::Io {
                path: path.to_string(),
                source,
            })?;

        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_local_fetch_truncates() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/notes.md"), "0123456789").unwrap();

        let fetcher = LocalFetcher::new(dir.path());
        assert_eq!(fetcher.fetch_sample("/docs/notes.md", 4).unwrap(), "0123");
        assert_eq!(fetcher.fetch_sample("docs/notes.md", 100).unwrap(), "0123456789");
    }

    #[test]
    fn test_local_fetch_stays_inside_root() {
        let outer = tempdir().unwrap();
        let mirror = outer.path().join("mirror");
        std::fs::create_dir_all(&mirror).unwrap();
        std::fs::write(outer.path().join("secret.txt"), "TOPSECRET").unwrap();

        let fetcher = LocalFetcher::new(&mirror);
        assert!(matches!(
            fetcher.fetch_sample("../secret.txt", 64),
            Err(FetchError::OutsideRoot(_))
        ));
        assert!(matches!(
            fetcher.fetch_sample("docs/../../secret.txt", 64),
            Err(FetchError::OutsideRoot(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_local_fetch_rejects_symlink_out_of_root() {
        let outer = tempdir().unwrap();
        let mirror = outer.path().join("mirror");
        std::fs::create_dir_all(&mirror).unwrap();
        std::fs::write(outer.path().join("secret.txt"), "TOPSECRET").unwrap();
        std::os::unix::fs::symlink(outer.path().join("secret.txt"), mirror.join("link.txt")).unwrap();

        let fetcher = LocalFetcher::new(&mirror);
        assert!(matches!(
            fetcher.fetch_sample("link.txt", 64),
            Err(FetchError::OutsideRoot(_))
        ));
    }

    #[test]
    fn test_local_fetch_missing() {
        let dir = tempdir().unwrap();
        let fetcher = LocalFetcher::new(dir.path());
        assert!(matches!(
            fetcher.fetch_sample("missing.txt", 10),
            Err(FetchError::NotFound(_))
        ));
    }
}

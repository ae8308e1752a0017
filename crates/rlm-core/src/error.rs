//! Error taxonomy: structural failures abort the run, fetch failures are per-entry.

use std::io;
use std::path::PathBuf;

/// Fatal, run-level error. Any of these leaves the previous manifest and the
/// files on disk untouched.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Source list missing or unreadable. Raised before any mutation.
    #[error("source list {}: {source}", .path.display())]
    SourceList {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Two sources resolved to the same local filename even after
    /// disambiguation. Proceeding would silently overwrite one of them.
    #[error("local filename {filename:?} assigned to multiple sources: {urls:?}")]
    FilenameCollision { filename: String, urls: Vec<String> },

    /// Manifest, deletion list, URL list, or target directory could not be
    /// written/created.
    #[error("persist {what}: {message}")]
    Persist { what: String, message: String },

    /// Run was interrupted; the manifest commit was skipped.
    #[error("sync cancelled before commit")]
    Cancelled,
}

impl SyncError {
    pub(crate) fn persist(what: &str, err: impl std::fmt::Display) -> Self {
        SyncError::Persist {
            what: what.to_string(),
            message: err.to_string(),
        }
    }
}

/// Error for a single fetch (curl failure, HTTP error, or timeout).
/// Recovered per entry: the entry keeps its prior hash and local file.
#[derive(Debug)]
pub enum FetchError {
    /// Curl reported a transfer error (connection, TLS, DNS, etc.).
    Curl(curl::Error),
    /// Response had a non-2xx status.
    Http(u32),
    /// Transfer exceeded the configured per-fetch deadline.
    Timeout,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Curl(e) => write!(f, "{}", e),
            FetchError::Http(code) => write!(f, "HTTP {}", code),
            FetchError::Timeout => write!(f, "timed out"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Curl(e) => Some(e),
            FetchError::Http(_) | FetchError::Timeout => None,
        }
    }
}

impl From<curl::Error> for FetchError {
    fn from(e: curl::Error) -> Self {
        if e.is_operation_timedout() {
            FetchError::Timeout
        } else {
            FetchError::Curl(e)
        }
    }
}

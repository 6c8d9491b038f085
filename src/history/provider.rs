//! HistoryProvider trait definition

use std::path::Path;
use thiserror::Error;

/// Errors raised while querying version-control history
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The version-control binary could not be started
    #[error("git {operation} could not be started: {source}")]
    Spawn {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The query did not finish within the configured timeout
    #[error("git {operation} timed out after {seconds} seconds")]
    Timeout {
        operation: &'static str,
        seconds: u64,
    },

    /// The query ran but reported failure
    #[error("git {operation} failed: {message}")]
    Failed {
        operation: &'static str,
        message: String,
    },

    /// Waiting on the child process failed
    #[error("git {operation} I/O error: {source}")]
    Io {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Read-only view of the history of files in a repository
///
/// Paths are relative to the repository root the provider was built for.
pub trait HistoryProvider {
    /// Whether the path is known to version control
    fn is_tracked(&self, path: &Path) -> Result<bool, HistoryError>;

    /// Revision ids touching the path, most recent first
    fn revisions_touching(&self, path: &Path) -> Result<Vec<String>, HistoryError>;

    /// Nearest-tag description of a revision, `None` if no tag reaches it
    fn describe(&self, revision: &str) -> Result<Option<String>, HistoryError>;
}

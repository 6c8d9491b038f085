//! Error types for manifest generation
//!
//! Fatal conditions abort the run and surface as [`RegenError`]. Per-file
//! problems never abort: they are recorded as a [`SkipReason`] and the run
//! moves on to the next file.

use crate::config::ConfigError;
use crate::history::HistoryError;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a whole run
#[derive(Debug, Error)]
pub enum RegenError {
    /// Configuration could not be validated
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A discovery pattern was malformed or a directory could not be listed
    #[error("File discovery failed for pattern '{pattern}': {message}")]
    Discovery { pattern: String, message: String },

    /// The manifest could not be written
    #[error("Failed to write manifest to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a discovered file contributed nothing to the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Not tracked, or tracked without any committed revision
    Untracked,

    /// A history query failed or timed out
    History(String),

    /// The source file could not be read
    Unreadable(String),
}

impl From<HistoryError> for SkipReason {
    fn from(err: HistoryError) -> Self {
        SkipReason::History(err.to_string())
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Untracked => write!(f, "is not in git"),
            SkipReason::History(message) => write!(f, "git could not resolve: {}", message),
            SkipReason::Unreadable(message) => write!(f, "could not be read: {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untracked_reads_like_a_sentence() {
        let line = format!("Skipping `m_foo` which {}", SkipReason::Untracked);
        assert_eq!(line, "Skipping `m_foo` which is not in git");
    }

    #[test]
    fn test_history_error_becomes_soft_skip() {
        let reason: SkipReason = HistoryError::Timeout {
            operation: "log",
            seconds: 5,
        }
        .into();

        match reason {
            SkipReason::History(message) => assert!(message.contains("timed out")),
            other => panic!("Expected History skip, got {:?}", other),
        }
    }

    #[test]
    fn test_write_error_names_path() {
        let err = RegenError::Write {
            path: PathBuf::from("/readonly/modules.lst"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/readonly/modules.lst"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_skip_reason_serializes_with_kind() {
        let json = serde_json::to_string(&SkipReason::Unreadable("gone".to_string())).unwrap();
        assert_eq!(json, r#"{"kind":"unreadable","detail":"gone"}"#);
    }
}

use super::{git_path, HistoryError, HistoryProvider};
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

#[derive(Debug, Clone)]
enum MockFile {
    Tracked(Vec<String>),
    Failing(String),
}

/// In-memory history with canned answers
///
/// Paths not registered are reported as untracked. Revisions without a
/// registered description describe to `None`.
pub struct MockHistory {
    files: RwLock<HashMap<String, MockFile>>,
    descriptions: RwLock<HashMap<String, String>>,
}

impl MockHistory {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            descriptions: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a tracked path with its revisions, most recent first
    pub fn add_tracked(&self, path: impl AsRef<Path>, revisions: &[&str]) {
        self.files.write().unwrap().insert(
            git_path(path.as_ref()),
            MockFile::Tracked(revisions.iter().map(|r| r.to_string()).collect()),
        );
    }

    /// Registers a path whose history queries fail with the given message
    pub fn add_failing(&self, path: impl AsRef<Path>, message: &str) {
        self.files
            .write()
            .unwrap()
            .insert(git_path(path.as_ref()), MockFile::Failing(message.to_string()));
    }

    pub fn add_description(&self, revision: &str, description: &str) {
        self.descriptions
            .write()
            .unwrap()
            .insert(revision.to_string(), description.to_string());
    }

    fn lookup(&self, path: &Path) -> Option<MockFile> {
        self.files.read().unwrap().get(&git_path(path)).cloned()
    }
}

impl Default for MockHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryProvider for MockHistory {
    fn is_tracked(&self, path: &Path) -> Result<bool, HistoryError> {
        match self.lookup(path) {
            Some(MockFile::Tracked(_)) => Ok(true),
            Some(MockFile::Failing(message)) => Err(HistoryError::Failed {
                operation: "ls-files",
                message,
            }),
            None => Ok(false),
        }
    }

    fn revisions_touching(&self, path: &Path) -> Result<Vec<String>, HistoryError> {
        match self.lookup(path) {
            Some(MockFile::Tracked(revisions)) => Ok(revisions),
            Some(MockFile::Failing(message)) => Err(HistoryError::Failed {
                operation: "log",
                message,
            }),
            None => Ok(Vec::new()),
        }
    }

    fn describe(&self, revision: &str) -> Result<Option<String>, HistoryError> {
        Ok(self.descriptions.read().unwrap().get(revision).cloned())
    }
}

//! History provider backed by the `git` command-line tool
//!
//! Every query is a blocking child process bounded by a timeout. A query
//! that outlives the timeout is killed and reported as
//! [`HistoryError::Timeout`].

use super::{HistoryError, HistoryProvider};
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, trace};
use wait_timeout::ChildExt;

/// Default timeout for a single git invocation
pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Queries history by running `git` inside the repository root
///
/// Git runs under the C locale so its messages can be matched.
#[derive(Debug, Clone)]
pub struct GitHistory {
    repo_root: PathBuf,
    timeout: Duration,
    program: PathBuf,
}

impl GitHistory {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
            timeout: DEFAULT_GIT_TIMEOUT,
            program: PathBuf::from("git"),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Uses a different git executable
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    fn run(&self, args: &[&str], operation: &'static str) -> Result<Output, HistoryError> {
        trace!(?args, root = %self.repo_root.display(), "Running git");

        let mut child = Command::new(&self.program)
            .args(args)
            .current_dir(&self.repo_root)
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| HistoryError::Spawn { operation, source })?;

        // Drain the pipes while waiting so a chatty child cannot block on a full buffer.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        match child
            .wait_timeout(self.timeout)
            .map_err(|source| HistoryError::Io { operation, source })?
        {
            Some(status) => Ok(Output {
                status,
                stdout: collect(stdout),
                stderr: collect(stderr),
            }),
            None => {
                let _ = child.kill();
                let _ = child.wait();
                debug!(operation, "git timed out, child killed");
                Err(HistoryError::Timeout {
                    operation,
                    seconds: self.timeout.as_secs(),
                })
            }
        }
    }
}

impl HistoryProvider for GitHistory {
    fn is_tracked(&self, path: &Path) -> Result<bool, HistoryError> {
        let spec = git_path(path);
        let output = self.run(&["ls-files", "--error-unmatch", "--", &spec], "ls-files")?;

        if output.status.success() {
            return Ok(true);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("did not match") {
            Ok(false)
        } else {
            Err(HistoryError::Failed {
                operation: "ls-files",
                message: stderr.trim().to_owned(),
            })
        }
    }

    fn revisions_touching(&self, path: &Path) -> Result<Vec<String>, HistoryError> {
        let spec = git_path(path);
        let output = self.run(&["log", "--format=%H", "--", &spec], "log")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HistoryError::Failed {
                operation: "log",
                message: stderr.trim().to_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect())
    }

    fn describe(&self, revision: &str) -> Result<Option<String>, HistoryError> {
        let output = self.run(&["describe", "--tags", "--long", revision], "describe")?;

        // describe exits non-zero when no tag can reach the revision
        if !output.status.success() {
            debug!(
                revision,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "No tag describes revision"
            );
            return Ok(None);
        }

        let described = String::from_utf8_lossy(&output.stdout).trim().to_owned();
        Ok(Some(described).filter(|d| !d.is_empty()))
    }
}

/// Renders a relative path with `/` separators for git pathspecs and URLs
pub fn git_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

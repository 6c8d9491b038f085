//! Version-control history abstraction for testable version resolution

mod git;
mod mock;
mod provider;

pub use git::{git_path, GitHistory, DEFAULT_GIT_TIMEOUT};
pub use mock::MockHistory;
pub use provider::{HistoryError, HistoryProvider};

//! Version resolution from version-control history
//!
//! A file's version is a token computed from its history under one
//! [`VersionPolicy`], prefixed by the name of the directory holding the
//! file when the file is not in the repository root (`2.0/m_foo.cpp` at
//! revision count 7 becomes `2.0.7`).

use crate::discovery::ModuleFile;
use crate::error::SkipReason;
use crate::history::{git_path, HistoryProvider};
use clap::ValueEnum;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Default tag whose describe output carries the revision number
pub const DEFAULT_TAG_PREFIX: &str = "init";

/// Default source URL template
pub const DEFAULT_URL_TEMPLATE: &str =
    "http://gitorious.org/inspircd/inspircd-extras/blobs/raw/{rev}/{path}";

/// Length of the abbreviated commit id used when no tag describes a revision
const SHORT_COMMIT_LEN: usize = 7;

/// How the version token is computed
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionPolicy {
    /// Nearest-tag description of the latest commit, tag prefix and hash stripped
    #[default]
    Describe,
    /// Number of commits touching the file
    Count,
    /// Full id of the latest commit touching the file
    Commit,
}

impl fmt::Display for VersionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VersionPolicy::Describe => "describe",
            VersionPolicy::Count => "count",
            VersionPolicy::Commit => "commit",
        };
        f.write_str(name)
    }
}

impl FromStr for VersionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "describe" => Ok(VersionPolicy::Describe),
            "count" => Ok(VersionPolicy::Count),
            "commit" => Ok(VersionPolicy::Commit),
            other => Err(format!(
                "Invalid version policy: {}. Valid options: describe, count, commit",
                other
            )),
        }
    }
}

/// History facts gathered for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionRecord {
    /// Most recent commit touching the file
    pub commit: String,
    /// Number of commits touching the file
    pub revision_count: usize,
    /// Nearest-tag description of `commit`, when requested and available
    pub described: Option<String>,
    /// Parent directory name for nested layouts
    pub prefix: Option<String>,
    /// Final version string
    pub version: String,
}

/// Source URL template with `{rev}` and `{path}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUrl {
    template: String,
    branch: Option<String>,
}

impl SourceUrl {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            branch: None,
        }
    }

    /// Pins every URL to a branch instead of the resolved commit
    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch.filter(|b| !b.trim().is_empty());
        self
    }

    pub fn render(&self, commit: &str, path: &str) -> String {
        let rev = self.branch.as_deref().unwrap_or(commit);
        self.template.replace("{rev}", rev).replace("{path}", path)
    }
}

impl Default for SourceUrl {
    fn default() -> Self {
        Self::new(DEFAULT_URL_TEMPLATE)
    }
}

/// Resolves version records for module files
pub struct VersionResolver<'a, H: HistoryProvider + ?Sized> {
    history: &'a H,
    policy: VersionPolicy,
    describe_pattern: Regex,
}

impl<'a, H: HistoryProvider + ?Sized> VersionResolver<'a, H> {
    pub fn new(history: &'a H, policy: VersionPolicy, tag_prefix: &str) -> Self {
        let describe_pattern = Regex::new(&format!("{}-(.*)-g.*", regex::escape(tag_prefix)))
            .expect("escaped prefix forms a valid regex");
        Self {
            history,
            policy,
            describe_pattern,
        }
    }

    pub fn policy(&self) -> VersionPolicy {
        self.policy
    }

    /// Queries history for `file`; untracked files and failed queries skip
    pub fn resolve(&self, file: &ModuleFile) -> Result<VersionRecord, SkipReason> {
        let path = &file.relative;

        if !self.history.is_tracked(path)? {
            debug!(path = %git_path(path), "Not tracked");
            return Err(SkipReason::Untracked);
        }

        let revisions = self.history.revisions_touching(path)?;
        let commit = match revisions.first() {
            Some(commit) => commit.clone(),
            None => {
                debug!(path = %git_path(path), "Tracked but never committed");
                return Err(SkipReason::Untracked);
            }
        };

        let (token, described) = match self.policy {
            VersionPolicy::Describe => {
                let described = self.history.describe(&commit)?;
                let token = match &described {
                    Some(d) => self.strip_description(d),
                    None => short_commit(&commit).to_string(),
                };
                (token, described)
            }
            VersionPolicy::Count => (revisions.len().to_string(), None),
            VersionPolicy::Commit => (commit.clone(), None),
        };

        let prefix = file.directory().map(str::to_owned);
        let version = match &prefix {
            Some(prefix) => format!("{}.{}", prefix, token),
            None => token,
        };

        debug!(
            path = %git_path(path),
            policy = %self.policy,
            commit = %commit,
            version = %version,
            "Resolved version"
        );

        Ok(VersionRecord {
            commit,
            revision_count: revisions.len(),
            described,
            prefix,
            version,
        })
    }

    /// `init-12-gdeadbee` becomes `12`; descriptions not in that shape pass through
    fn strip_description(&self, described: &str) -> String {
        self.describe_pattern.replace(described, "$1").into_owned()
    }
}

fn short_commit(commit: &str) -> &str {
    commit
        .char_indices()
        .nth(SHORT_COMMIT_LEN)
        .map(|(idx, _)| &commit[..idx])
        .unwrap_or(commit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MockHistory;
    use std::path::PathBuf;
    use yare::parameterized;

    fn module(rel: &str) -> ModuleFile {
        ModuleFile {
            relative: PathBuf::from(rel),
            absolute: PathBuf::from("/repo").join(rel),
        }
    }

    fn history() -> MockHistory {
        let history = MockHistory::new();
        history.add_tracked(
            "2.0/m_nested.cpp",
            &["cccccccccc", "bbbbbbbbbb", "aaaaaaaaaa"],
        );
        history.add_tracked("m_flat.cpp", &["ffffffffff", "eeeeeeeeee"]);
        history.add_description("cccccccccc", "init-12-gccccccc");
        history.add_description("ffffffffff", "init-3-gfffffff");
        history
    }

    #[parameterized(
        describe_nested = { VersionPolicy::Describe, "2.0/m_nested.cpp", "2.0.12" },
        describe_flat = { VersionPolicy::Describe, "m_flat.cpp", "3" },
        count_nested = { VersionPolicy::Count, "2.0/m_nested.cpp", "2.0.3" },
        count_flat = { VersionPolicy::Count, "m_flat.cpp", "2" },
        commit_nested = { VersionPolicy::Commit, "2.0/m_nested.cpp", "2.0.cccccccccc" },
        commit_flat = { VersionPolicy::Commit, "m_flat.cpp", "ffffffffff" },
    )]
    fn test_policies(policy: VersionPolicy, path: &str, expected: &str) {
        let history = history();
        let resolver = VersionResolver::new(&history, policy, DEFAULT_TAG_PREFIX);

        let record = resolver.resolve(&module(path)).unwrap();
        assert_eq!(record.version, expected);
    }

    #[test]
    fn test_record_carries_history_facts() {
        let history = history();
        let resolver = VersionResolver::new(&history, VersionPolicy::Describe, "init");

        let record = resolver.resolve(&module("2.0/m_nested.cpp")).unwrap();
        assert_eq!(record.commit, "cccccccccc");
        assert_eq!(record.revision_count, 3);
        assert_eq!(record.described.as_deref(), Some("init-12-gccccccc"));
        assert_eq!(record.prefix.as_deref(), Some("2.0"));
    }

    #[test]
    fn test_untracked_is_skipped() {
        let history = history();
        let resolver = VersionResolver::new(&history, VersionPolicy::Describe, "init");

        let err = resolver.resolve(&module("2.0/m_new.cpp")).unwrap_err();
        assert_eq!(err, SkipReason::Untracked);
    }

    #[test]
    fn test_tracked_without_commits_is_skipped() {
        let history = history();
        history.add_tracked("m_staged.cpp", &[]);
        let resolver = VersionResolver::new(&history, VersionPolicy::Count, "init");

        let err = resolver.resolve(&module("m_staged.cpp")).unwrap_err();
        assert_eq!(err, SkipReason::Untracked);
    }

    #[test]
    fn test_history_failure_is_skipped() {
        let history = history();
        history.add_failing("m_broken.cpp", "fatal: bad object");
        let resolver = VersionResolver::new(&history, VersionPolicy::Commit, "init");

        match resolver.resolve(&module("m_broken.cpp")).unwrap_err() {
            SkipReason::History(message) => assert!(message.contains("bad object")),
            other => panic!("Expected History skip, got {:?}", other),
        }
    }

    #[test]
    fn test_describe_without_tag_falls_back_to_short_commit() {
        let history = MockHistory::new();
        history.add_tracked("m_untagged.cpp", &["0123456789abcdef"]);
        let resolver = VersionResolver::new(&history, VersionPolicy::Describe, "init");

        let record = resolver.resolve(&module("m_untagged.cpp")).unwrap();
        assert_eq!(record.version, "0123456");
        assert_eq!(record.described, None);
    }

    #[test]
    fn test_describe_on_the_tag_itself_is_zero() {
        let history = MockHistory::new();
        history.add_tracked("2.0/m_initial.cpp", &["abcdef0123"]);
        history.add_description("abcdef0123", "init-0-gabcdef0");
        let resolver = VersionResolver::new(&history, VersionPolicy::Describe, "init");

        let record = resolver.resolve(&module("2.0/m_initial.cpp")).unwrap();
        assert_eq!(record.version, "2.0.0");
    }

    #[test]
    fn test_describe_on_tagged_commit_passes_through() {
        let history = MockHistory::new();
        history.add_tracked("m_tagged.cpp", &["abc"]);
        history.add_description("abc", "v2.1");
        let resolver = VersionResolver::new(&history, VersionPolicy::Describe, "init");

        let record = resolver.resolve(&module("m_tagged.cpp")).unwrap();
        assert_eq!(record.version, "v2.1");
    }

    #[test]
    fn test_custom_tag_prefix_is_literal() {
        let history = MockHistory::new();
        history.add_tracked("m_x.cpp", &["abc"]);
        history.add_description("abc", "rel.1-40-gabc");
        let resolver = VersionResolver::new(&history, VersionPolicy::Describe, "rel.1");

        let record = resolver.resolve(&module("m_x.cpp")).unwrap();
        assert_eq!(record.version, "40");
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("describe".parse::<VersionPolicy>(), Ok(VersionPolicy::Describe));
        assert_eq!("COUNT".parse::<VersionPolicy>(), Ok(VersionPolicy::Count));
        assert_eq!(" commit ".parse::<VersionPolicy>(), Ok(VersionPolicy::Commit));
        assert!("latest".parse::<VersionPolicy>().is_err());
        assert_eq!(VersionPolicy::default().to_string(), "describe");
    }

    #[test]
    fn test_source_url_uses_commit() {
        let url = SourceUrl::default().render("abc123", "2.0/m_foo.cpp");
        assert_eq!(
            url,
            "http://gitorious.org/inspircd/inspircd-extras/blobs/raw/abc123/2.0/m_foo.cpp"
        );
    }

    #[test]
    fn test_source_url_prefers_branch() {
        let url = SourceUrl::new("https://example.org/raw/{rev}/{path}")
            .with_branch(Some("master".to_string()))
            .render("abc123", "m_foo.cpp");
        assert_eq!(url, "https://example.org/raw/master/m_foo.cpp");
    }

    #[test]
    fn test_blank_branch_is_ignored() {
        let url = SourceUrl::new("{rev}:{path}")
            .with_branch(Some("  ".to_string()))
            .render("abc123", "m_foo.cpp");
        assert_eq!(url, "abc123:m_foo.cpp");
    }
}

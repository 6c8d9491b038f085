//! Configuration management for regen-modules
//!
//! Settings are loaded from environment variables with sensible defaults;
//! command-line flags override them in the CLI handler.
//!
//! # Environment Variables
//!
//! - `REGEN_PATTERNS`: Comma-separated discovery globs - default: "m_*.cpp,*/m_*.cpp"
//! - `REGEN_OUTPUT`: Manifest path, relative to the root - default: "modules.lst"
//! - `REGEN_VERSION_POLICY`: describe|count|commit - default: "describe"
//! - `REGEN_URL_TEMPLATE`: Source URL with `{rev}` and `{path}` placeholders
//! - `REGEN_BRANCH`: Static branch for source URLs - default: resolved commit
//! - `REGEN_TAG_PREFIX`: Tag stripped from describe output - default: "init"
//! - `REGEN_GIT_TIMEOUT`: Per-invocation git timeout in seconds - default: "30"
//! - `REGEN_LOG_LEVEL`: Logging level - default: "info"
//!
//! # Example
//!
//! ```no_run
//! use regen_modules::RegenConfig;
//!
//! let config = RegenConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("{}", config);
//! ```

use crate::discovery::default_patterns;
use crate::manifest::DEFAULT_OUTPUT;
use crate::version::{SourceUrl, VersionPolicy, DEFAULT_TAG_PREFIX, DEFAULT_URL_TEMPLATE};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_GIT_TIMEOUT_SECS: u64 = 30;
const MAX_GIT_TIMEOUT_SECS: u64 = 600;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Main configuration structure for regen-modules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegenConfig {
    /// Repository root; patterns and relative output paths resolve against it
    pub root: PathBuf,

    /// Glob patterns naming module sources
    pub patterns: Vec<String>,

    /// Manifest file
    pub output: PathBuf,

    pub version_policy: VersionPolicy,

    /// Source URL template
    pub url_template: String,

    /// Static branch used in URLs instead of the resolved commit
    pub branch: Option<String>,

    /// Tag whose describe output carries the revision number
    pub tag_prefix: String,

    /// Timeout per git invocation in seconds
    pub git_timeout_secs: u64,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for RegenConfig {
    /// Loads REGEN_* environment variables, falling back to defaults
    fn default() -> Self {
        let patterns = env::var("REGEN_PATTERNS")
            .ok()
            .map(|v| split_patterns(&v))
            .filter(|p| !p.is_empty())
            .unwrap_or_else(default_patterns);

        let output = env::var("REGEN_OUTPUT")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

        let version_policy = env::var("REGEN_VERSION_POLICY")
            .ok()
            .and_then(|v| v.parse::<VersionPolicy>().ok())
            .unwrap_or_default();

        let url_template = env::var("REGEN_URL_TEMPLATE")
            .unwrap_or_else(|_| DEFAULT_URL_TEMPLATE.to_string());

        let branch = env::var("REGEN_BRANCH")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let tag_prefix =
            env::var("REGEN_TAG_PREFIX").unwrap_or_else(|_| DEFAULT_TAG_PREFIX.to_string());

        let git_timeout_secs = env::var("REGEN_GIT_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_GIT_TIMEOUT_SECS);

        let log_level = env::var("REGEN_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            root: PathBuf::from("."),
            patterns,
            output,
            version_policy,
            url_template,
            branch,
            tag_prefix,
            git_timeout_secs,
            log_level,
        }
    }
}

impl RegenConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any validation fails
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.patterns.iter().all(|p| p.trim().is_empty()) {
            return Err(ConfigError::ValidationFailed(
                "At least one discovery pattern is required".to_string(),
            ));
        }

        if self.git_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Git timeout must be at least 1 second".to_string(),
            ));
        }
        if self.git_timeout_secs > MAX_GIT_TIMEOUT_SECS {
            return Err(ConfigError::ValidationFailed(
                "Git timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        if !self.url_template.contains("{path}") {
            return Err(ConfigError::ValidationFailed(format!(
                "URL template must contain {{path}}: {}",
                self.url_template
            )));
        }

        if self.version_policy == VersionPolicy::Describe && self.tag_prefix.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Tag prefix cannot be empty with the describe policy".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    /// Manifest path, resolved against the root when relative
    pub fn output_path(&self) -> PathBuf {
        resolve_against(&self.root, &self.output)
    }

    pub fn git_timeout(&self) -> Duration {
        Duration::from_secs(self.git_timeout_secs)
    }

    pub fn source_url(&self) -> SourceUrl {
        SourceUrl::new(self.url_template.clone()).with_branch(self.branch.clone())
    }
}

impl fmt::Display for RegenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Regen Configuration:")?;
        writeln!(f, "  Root: {}", self.root.display())?;
        writeln!(f, "  Patterns: {}", self.patterns.join(", "))?;
        writeln!(f, "  Output: {}", self.output_path().display())?;
        writeln!(f, "  Version Policy: {}", self.version_policy)?;
        writeln!(f, "  URL Template: {}", self.url_template)?;
        if let Some(ref branch) = self.branch {
            writeln!(f, "  Branch: {}", branch)?;
        }
        writeln!(f, "  Tag Prefix: {}", self.tag_prefix)?;
        writeln!(f, "  Git Timeout: {}s", self.git_timeout_secs)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}

/// Splits a comma-separated pattern list, dropping blanks
pub fn split_patterns(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect()
}

fn resolve_against(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
pub(crate) mod test_env {
    use std::env;

    const VARS: [&str; 8] = [
        "REGEN_PATTERNS",
        "REGEN_OUTPUT",
        "REGEN_VERSION_POLICY",
        "REGEN_URL_TEMPLATE",
        "REGEN_BRANCH",
        "REGEN_TAG_PREFIX",
        "REGEN_GIT_TIMEOUT",
        "REGEN_LOG_LEVEL",
    ];

    /// Helper to temporarily set environment variables for testing
    pub(crate) struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        pub(crate) fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        pub(crate) fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    /// Unsets every REGEN_* variable until the guards drop
    pub(crate) fn clean_env() -> Vec<EnvGuard> {
        VARS.iter().map(|k| EnvGuard::unset(k)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_env::{clean_env, EnvGuard};
    use super::*;
    use serial_test::serial;

    fn valid_config() -> RegenConfig {
        RegenConfig {
            root: PathBuf::from("/repo"),
            patterns: default_patterns(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            version_policy: VersionPolicy::Describe,
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            branch: None,
            tag_prefix: "init".to_string(),
            git_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = clean_env();

        let config = RegenConfig::default();

        assert_eq!(config.patterns, ["m_*.cpp", "*/m_*.cpp"]);
        assert_eq!(config.output, PathBuf::from("modules.lst"));
        assert_eq!(config.version_policy, VersionPolicy::Describe);
        assert_eq!(config.url_template, DEFAULT_URL_TEMPLATE);
        assert_eq!(config.branch, None);
        assert_eq!(config.tag_prefix, DEFAULT_TAG_PREFIX);
        assert_eq!(config.git_timeout_secs, DEFAULT_GIT_TIMEOUT_SECS);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _clean = clean_env();
        let _guards = vec![
            EnvGuard::set("REGEN_PATTERNS", "2.0/m_*.cpp, 3/m_*.cpp ,"),
            EnvGuard::set("REGEN_OUTPUT", "out/list.txt"),
            EnvGuard::set("REGEN_VERSION_POLICY", "Count"),
            EnvGuard::set("REGEN_URL_TEMPLATE", "https://example.org/{rev}/{path}"),
            EnvGuard::set("REGEN_BRANCH", "master"),
            EnvGuard::set("REGEN_TAG_PREFIX", "base"),
            EnvGuard::set("REGEN_GIT_TIMEOUT", "5"),
            EnvGuard::set("REGEN_LOG_LEVEL", "DEBUG"),
        ];

        let config = RegenConfig::default();

        assert_eq!(config.patterns, ["2.0/m_*.cpp", "3/m_*.cpp"]);
        assert_eq!(config.output, PathBuf::from("out/list.txt"));
        assert_eq!(config.version_policy, VersionPolicy::Count);
        assert_eq!(config.url_template, "https://example.org/{rev}/{path}");
        assert_eq!(config.branch.as_deref(), Some("master"));
        assert_eq!(config.tag_prefix, "base");
        assert_eq!(config.git_timeout_secs, 5);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    #[serial]
    fn test_unparseable_values_fall_back() {
        let _clean = clean_env();
        let _guards = vec![
            EnvGuard::set("REGEN_VERSION_POLICY", "newest"),
            EnvGuard::set("REGEN_GIT_TIMEOUT", "soon"),
            EnvGuard::set("REGEN_PATTERNS", " , "),
        ];

        let config = RegenConfig::default();

        assert_eq!(config.version_policy, VersionPolicy::Describe);
        assert_eq!(config.git_timeout_secs, DEFAULT_GIT_TIMEOUT_SECS);
        assert_eq!(config.patterns, default_patterns());
    }

    #[test]
    fn test_configuration_validation_valid() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_empty_patterns() {
        let mut config = valid_config();
        config.patterns = vec![" ".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_timeouts() {
        let mut config = valid_config();
        config.git_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.git_timeout_secs = MAX_GIT_TIMEOUT_SECS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_template_without_path() {
        let mut config = valid_config();
        config.url_template = "https://example.org/{rev}".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("{path}"));
    }

    #[test]
    fn test_empty_tag_prefix_only_matters_for_describe() {
        let mut config = valid_config();
        config.tag_prefix = String::new();
        assert!(config.validate().is_err());

        config.version_policy = VersionPolicy::Count;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_configuration_validation_invalid_log_level() {
        let mut config = valid_config();
        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_output_path_resolution() {
        let mut config = valid_config();
        assert_eq!(config.output_path(), PathBuf::from("/repo/modules.lst"));

        config.output = PathBuf::from("/tmp/elsewhere.lst");
        assert_eq!(config.output_path(), PathBuf::from("/tmp/elsewhere.lst"));
    }

    #[test]
    fn test_source_url_uses_branch() {
        let mut config = valid_config();
        config.branch = Some("master".to_string());

        let url = config.source_url().render("abc", "m_x.cpp");
        assert!(url.ends_with("/raw/master/m_x.cpp"));
    }

    #[test]
    fn test_config_display() {
        let display = format!("{}", valid_config());
        assert!(display.contains("Regen Configuration:"));
        assert!(display.contains("Version Policy: describe"));
        assert!(!display.contains("Branch:"));
    }
}

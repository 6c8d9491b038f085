//! Module source discovery
//!
//! Candidate files are found by glob patterns evaluated relative to the
//! repository root. Results keep pattern order, then the order the glob
//! walk yields them.

use crate::error::RegenError;
use glob::{MatchOptions, Pattern};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Flat module sources in the repository root
pub const FLAT_PATTERN: &str = "m_*.cpp";

/// Module sources one directory level deep, e.g. `2.0/m_foo.cpp`
pub const NESTED_PATTERN: &str = "*/m_*.cpp";

/// A discovered module source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleFile {
    /// Path relative to the repository root
    pub relative: PathBuf,
    /// Path usable for reading the file
    pub absolute: PathBuf,
}

impl ModuleFile {
    /// Immediate parent directory name, `None` for files in the root
    pub fn directory(&self) -> Option<&str> {
        self.relative
            .parent()
            .and_then(|parent| parent.file_name())
            .and_then(|name| name.to_str())
    }
}

pub fn default_patterns() -> Vec<String> {
    vec![FLAT_PATTERN.to_string(), NESTED_PATTERN.to_string()]
}

/// Enumerates files under `root` matching any of `patterns`
///
/// Zero matches is not an error. A malformed pattern or an unreadable
/// directory entry is.
pub fn discover(root: &Path, patterns: &[String]) -> Result<Vec<ModuleFile>, RegenError> {
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };
    let escaped_root = Pattern::escape(&root.to_string_lossy());

    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        let full = Path::new(&escaped_root).join(pattern);
        let full = full.to_string_lossy();
        debug!(pattern = %pattern, glob = %full, "Expanding pattern");

        let paths = glob::glob_with(&full, options).map_err(|e| RegenError::Discovery {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;

        for entry in paths {
            let absolute = entry.map_err(|e| RegenError::Discovery {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;

            if !absolute.is_file() {
                continue;
            }

            let relative = absolute
                .strip_prefix(root)
                .unwrap_or(&absolute)
                .to_path_buf();

            if seen.insert(relative.clone()) {
                debug!(path = %relative.display(), "Discovered module source");
                files.push(ModuleFile { relative, absolute });
            }
        }
    }

    info!(
        root = %root.display(),
        patterns = patterns.len(),
        found = files.len(),
        "Module discovery completed"
    );

    Ok(files)
}

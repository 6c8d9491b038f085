//! The `modules.lst` manifest format
//!
//! ```text
//! module m_example 2.0.12 http://host/raw/<commit>/2.0/m_example.cpp
//!  depends core 2.0
//!  description Does things
//! ```
//!
//! Each entry is a header line followed by one indented directive line per
//! tag value. Directives always appear in [`Directive::ALL`] order.

use crate::error::RegenError;
use crate::tags::{Directive, TagSet};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;

/// Default manifest file name
pub const DEFAULT_OUTPUT: &str = "modules.lst";

/// Module name for a source path: the file name without its extension
pub fn module_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// One module block of the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub name: String,
    pub version: String,
    pub url: String,
    pub directives: Vec<(Directive, String)>,
}

impl ManifestEntry {
    /// Builds an entry, taking only recognised tags in directive order
    pub fn new(name: String, version: String, url: String, tags: &TagSet) -> Self {
        let directives = Directive::ALL
            .iter()
            .flat_map(|&directive| {
                tags.directive(directive)
                    .iter()
                    .map(move |value| (directive, value.clone()))
            })
            .collect();

        Self {
            name,
            version,
            url,
            directives,
        }
    }
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "module {} {} {}", self.name, self.version, self.url)?;
        for (directive, value) in &self.directives {
            writeln!(f, " {} {}", directive.keyword(), value)?;
        }
        Ok(())
    }
}

/// Ordered collection of entries, serialised in one piece
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(entries: Vec<ManifestEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn render(&self) -> String {
        self.entries.iter().map(ToString::to_string).collect()
    }

    /// Writes the rendered manifest, replacing anything already at `path`
    pub fn write_to(&self, path: &Path) -> Result<(), RegenError> {
        let text = self.render();
        fs::write(path, &text).map_err(|source| RegenError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            path = %path.display(),
            modules = self.entries.len(),
            bytes = text.len(),
            "Manifest written"
        );
        Ok(())
    }
}

//! Manifest generation pipeline
//!
//! Discovery, version resolution, tag extraction and entry assembly run one
//! file at a time in discovery order. Per-file problems are recorded in the
//! [`GenerationReport`] and never stop the run.

use crate::config::RegenConfig;
use crate::discovery::{discover, ModuleFile};
use crate::error::{RegenError, SkipReason};
use crate::history::{git_path, HistoryProvider};
use crate::manifest::{module_name, Manifest, ManifestEntry};
use crate::tags::extract_tags;
use crate::version::{SourceUrl, VersionResolver};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// A discovered file that contributed nothing to the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedModule {
    pub name: String,
    pub path: PathBuf,
    pub reason: SkipReason,
}

impl SkippedModule {
    /// Console diagnostic for this skip
    pub fn diagnostic(&self) -> String {
        format!("Skipping `{}` which {}", self.name, self.reason)
    }
}

/// Outcome of one generation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub manifest: Manifest,
    pub skipped: Vec<SkippedModule>,
}

impl GenerationReport {
    /// Number of files discovered, emitted or not
    pub fn discovered(&self) -> usize {
        self.manifest.len() + self.skipped.len()
    }
}

/// Builds a manifest from module sources and their history
pub struct ManifestGenerator<H: HistoryProvider> {
    config: RegenConfig,
    history: H,
}

impl<H: HistoryProvider> ManifestGenerator<H> {
    pub fn new(config: RegenConfig, history: H) -> Self {
        Self { config, history }
    }

    pub fn config(&self) -> &RegenConfig {
        &self.config
    }

    /// Discovers and processes every module file without writing anything
    pub fn run(&self) -> Result<GenerationReport, RegenError> {
        self.config.validate()?;

        let start = Instant::now();
        info!(
            root = %self.config.root.display(),
            policy = %self.config.version_policy,
            "Starting manifest generation"
        );

        let files = discover(&self.config.root, &self.config.patterns)?;
        let resolver = VersionResolver::new(
            &self.history,
            self.config.version_policy,
            &self.config.tag_prefix,
        );
        let urls = self.config.source_url();

        let mut entries = Vec::with_capacity(files.len());
        let mut skipped = Vec::new();

        for file in &files {
            match self.process(file, &resolver, &urls) {
                Ok(entry) => entries.push(entry),
                Err(reason) => {
                    let skip = SkippedModule {
                        name: module_name(&file.relative),
                        path: file.relative.clone(),
                        reason,
                    };
                    debug!(path = %file.relative.display(), reason = %skip.reason, "Skipping module");
                    skipped.push(skip);
                }
            }
        }

        info!(
            modules = entries.len(),
            skipped = skipped.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "Manifest generation completed"
        );

        Ok(GenerationReport {
            manifest: Manifest::new(entries),
            skipped,
        })
    }

    /// Runs the pipeline and writes the manifest to the configured output
    pub fn generate(&self) -> Result<GenerationReport, RegenError> {
        let report = self.run()?;
        report.manifest.write_to(&self.config.output_path())?;
        Ok(report)
    }

    fn process(
        &self,
        file: &ModuleFile,
        resolver: &VersionResolver<'_, H>,
        urls: &SourceUrl,
    ) -> Result<ManifestEntry, SkipReason> {
        let record = resolver.resolve(file)?;

        let bytes = fs::read(&file.absolute).map_err(|e| SkipReason::Unreadable(e.to_string()))?;
        let tags = extract_tags(&String::from_utf8_lossy(&bytes));

        let name = module_name(&file.relative);
        let url = urls.render(&record.commit, &git_path(&file.relative));
        debug!(module = %name, version = %record.version, tags = tags.len(), "Assembled entry");

        Ok(ManifestEntry::new(name, record.version, url, &tags))
    }
}

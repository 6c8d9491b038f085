//! Run summary formatting
//!
//! The summary is what the CLI prints after a run: how many modules made it
//! into the manifest, where it went, and how many files were skipped.

use crate::generator::{GenerationReport, SkippedModule};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// Human-readable formatted text
    Human,
}

#[derive(Serialize)]
struct Summary<'a> {
    modules: Vec<&'a str>,
    written: usize,
    discovered: usize,
    output: Option<String>,
    skipped: &'a [SkippedModule],
}

/// Formatter for generation reports
pub struct SummaryFormatter {
    format: OutputFormat,
}

impl SummaryFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a report; `output` is `None` when the manifest went to stdout
    pub fn format(&self, report: &GenerationReport, output: Option<&Path>) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_json(report, output),
            OutputFormat::Human => Ok(self.format_human(report, output)),
        }
    }

    fn format_json(&self, report: &GenerationReport, output: Option<&Path>) -> Result<String> {
        let summary = Summary {
            modules: report
                .manifest
                .entries()
                .iter()
                .map(|e| e.name.as_str())
                .collect(),
            written: report.manifest.len(),
            discovered: report.discovered(),
            output: output.map(|p| p.display().to_string()),
            skipped: &report.skipped,
        };
        serde_json::to_string_pretty(&summary).context("Failed to serialize run summary to JSON")
    }

    fn format_human(&self, report: &GenerationReport, output: Option<&Path>) -> String {
        let mut out = String::new();
        let destination = output
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".to_string());

        let _ = writeln!(
            out,
            "Wrote {} of {} modules to {}",
            report.manifest.len(),
            report.discovered(),
            destination
        );

        // Skipped files are named by their diagnostic line only
        if !report.skipped.is_empty() {
            let _ = writeln!(out, "Skipped {}", report.skipped.len());
        }

        out
    }
}

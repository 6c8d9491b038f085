//! Command handlers: turn parsed arguments into a run and an exit code

use super::commands::CliArgs;
use super::output::SummaryFormatter;
use crate::config::RegenConfig;
use crate::generator::ManifestGenerator;
use crate::history::GitHistory;
use anyhow::{bail, Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Runs a full regeneration; returns the process exit code
pub fn handle_generate(args: &CliArgs) -> i32 {
    let root = match resolve_root(args.root.as_deref()) {
        Ok(root) => root,
        Err(e) => {
            error!("{:#}", e);
            return 1;
        }
    };
    debug!("Repository root: {}", root.display());

    let config = build_config(args, root);
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your environment variables and command-line arguments.");
        return 1;
    }
    debug!("{}", config);

    let history = GitHistory::new(&config.root).with_timeout(config.git_timeout());
    let generator = ManifestGenerator::new(config, history);

    let report = match generator.run() {
        Ok(report) => report,
        Err(e) => {
            error!("Manifest generation failed: {}", e);
            return 1;
        }
    };

    for skip in &report.skipped {
        eprintln!("{}", skip.diagnostic());
    }

    let output = if args.stdout {
        print!("{}", report.manifest.render());
        None
    } else {
        let path = generator.config().output_path();
        if let Err(e) = report.manifest.write_to(&path) {
            error!("{}", e);
            return 1;
        }
        Some(path)
    };

    if !args.quiet {
        match SummaryFormatter::new(args.summary.into()).format(&report, output.as_deref()) {
            // Keep stdout clean for the manifest itself
            Ok(summary) if args.stdout => eprint!("{}", summary),
            Ok(summary) => print!("{}", summary),
            Err(e) => {
                error!("Failed to format summary: {:#}", e);
                return 1;
            }
        }
    }

    info!(modules = report.manifest.len(), skipped = report.skipped.len(), "Done");
    0
}

/// Applies command-line overrides on top of the environment configuration
pub fn build_config(args: &CliArgs, root: PathBuf) -> RegenConfig {
    let defaults = RegenConfig::default();

    RegenConfig {
        root,
        patterns: if args.patterns.is_empty() {
            defaults.patterns
        } else {
            args.patterns.clone()
        },
        output: args.output.clone().unwrap_or(defaults.output),
        version_policy: args.version_policy.unwrap_or(defaults.version_policy),
        url_template: args.url_template.clone().unwrap_or(defaults.url_template),
        branch: args.branch.clone().or(defaults.branch),
        tag_prefix: args.tag_prefix.clone().unwrap_or(defaults.tag_prefix),
        git_timeout_secs: args.git_timeout.unwrap_or(defaults.git_timeout_secs),
        log_level: args
            .log_level
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or(defaults.log_level),
    }
}

fn resolve_root(root: Option<&Path>) -> Result<PathBuf> {
    let root = match root {
        Some(root) => root.to_path_buf(),
        None => env::current_dir().context("Failed to get current directory")?,
    };

    if !root.exists() {
        bail!("Repository root does not exist: {}", root.display());
    }
    if !root.is_dir() {
        bail!("Repository root is not a directory: {}", root.display());
    }

    root.canonicalize()
        .with_context(|| format!("Failed to canonicalize repository root {}", root.display()))
}

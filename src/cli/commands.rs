use crate::version::VersionPolicy;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Regenerates the modules.lst manifest from module source tags and git history
#[derive(Parser, Debug)]
#[command(
    name = "regen-modules",
    version,
    about = "Regenerates the modules.lst manifest from module source tags and git history",
    long_about = "regen-modules scans module sources (m_*.cpp, optionally one directory deep) \
                  for embedded $ModDepends/$ModConflicts/$ModDesc/$ModMask comments, asks git \
                  for each file's version, and writes one manifest block per module.\n\n\
                  Files that are not in git are skipped with a diagnostic.\n\n\
                  Examples:\n  \
                  regen-modules\n  \
                  regen-modules /path/to/extras --version-policy count\n  \
                  regen-modules --pattern '3/m_*.cpp' --stdout"
)]
pub struct CliArgs {
    #[arg(
        value_name = "ROOT",
        help = "Repository root to scan (defaults to current directory)"
    )]
    pub root: Option<PathBuf>,

    #[arg(
        short = 'p',
        long = "pattern",
        value_name = "GLOB",
        help = "Module source glob relative to the root (repeatable; default: m_*.cpp and */m_*.cpp)"
    )]
    pub patterns: Vec<String>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Manifest file, relative to the root unless absolute (default: modules.lst)"
    )]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, help = "How version numbers are computed (default: describe)")]
    pub version_policy: Option<VersionPolicy>,

    #[arg(
        long,
        value_name = "TEMPLATE",
        help = "Source URL template with {rev} and {path} placeholders"
    )]
    pub url_template: Option<String>,

    #[arg(
        long,
        value_name = "BRANCH",
        help = "Use a fixed branch in source URLs instead of the resolved commit"
    )]
    pub branch: Option<String>,

    #[arg(
        long,
        value_name = "TAG",
        help = "Tag stripped from describe output, e.g. init-12-gabc -> 12 (default: init)"
    )]
    pub tag_prefix: Option<String>,

    #[arg(
        long,
        value_name = "SECONDS",
        help = "Timeout for each git invocation (default: 30)"
    )]
    pub git_timeout: Option<u64>,

    #[arg(long, help = "Print the manifest to stdout instead of writing the file")]
    pub stdout: bool,

    #[arg(
        short = 's',
        long,
        value_enum,
        default_value = "human",
        help = "Run summary format"
    )]
    pub summary: SummaryFormatArg,

    #[arg(long, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress everything but errors and skip diagnostics"
    )]
    pub quiet: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryFormatArg {
    Human,
    Json,
}

impl From<SummaryFormatArg> for super::output::OutputFormat {
    fn from(arg: SummaryFormatArg) -> Self {
        match arg {
            SummaryFormatArg::Human => super::output::OutputFormat::Human,
            SummaryFormatArg::Json => super::output::OutputFormat::Json,
        }
    }
}

//! regen-modules - manifest generator for module source trees
//!
//! Scans module sources for embedded `$Tag: value` comments, asks version
//! control for each file's version, and writes a flat `modules.lst`
//! manifest listing every module with its dependencies, conflicts,
//! description and mask.
//!
//! # Example Usage
//!
//! ```no_run
//! use regen_modules::{GitHistory, ManifestGenerator, RegenConfig};
//!
//! let config = RegenConfig {
//!     root: "/srv/inspircd-extras".into(),
//!     ..RegenConfig::default()
//! };
//! let history = GitHistory::new(&config.root).with_timeout(config.git_timeout());
//!
//! let report = ManifestGenerator::new(config, history).generate()?;
//! for skip in &report.skipped {
//!     eprintln!("{}", skip.diagnostic());
//! }
//! # Ok::<(), regen_modules::RegenError>(())
//! ```
//!
//! # Project Structure
//!
//! - [`discovery`]: glob-based module source discovery
//! - [`tags`]: embedded tag extraction
//! - [`history`]: version-control history provider (git and in-memory)
//! - [`version`]: version policies and source URLs
//! - [`manifest`]: manifest entries and the `modules.lst` format
//! - [`generator`]: the per-file pipeline

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod generator;
pub mod history;
pub mod manifest;
pub mod tags;
pub mod util;
pub mod version;

pub use config::{ConfigError, RegenConfig};
pub use discovery::{discover, ModuleFile};
pub use error::{RegenError, SkipReason};
pub use generator::{GenerationReport, ManifestGenerator, SkippedModule};
pub use history::{GitHistory, HistoryError, HistoryProvider, MockHistory};
pub use manifest::{module_name, Manifest, ManifestEntry};
pub use tags::{extract_tags, Directive, TagSet};
pub use version::{SourceUrl, VersionPolicy, VersionRecord, VersionResolver};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

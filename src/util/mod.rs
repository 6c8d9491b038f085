//! Utility modules for regen-modules
//!
//! - Structured logging setup and configuration

pub mod logging;

pub use logging::{init_from_env, init_logging, parse_level, LoggingConfig};

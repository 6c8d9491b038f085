pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, SummaryFormatArg};
pub use handlers::handle_generate;
pub use output::{OutputFormat, SummaryFormatter};

//! CLI domain: parse, route, output, and presentation only.
//! Route handlers stay thin; all tree semantics live in `crate::tree`.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, OutputFormat};
pub use presentation::{format_log_json, format_log_text, format_root};
pub use route::RunContext;

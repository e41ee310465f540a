//! CLI parse: clap types for stagetree. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Stagetree CLI - inspect and apply staged action logs
#[derive(Parser)]
#[command(name = "stagetree")]
#[command(about = "Stage, inspect and commit file tree action logs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the actions of an exported log
    Show {
        /// Action log file (JSON, or bincode with a .bin extension)
        log: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Stage a log over a directory and commit it
    Apply {
        /// Action log file (JSON, or bincode with a .bin extension)
        log: PathBuf,
        /// Directory the log applies to
        #[arg(long)]
        root: PathBuf,
        /// Validate and report without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the state root of a directory
    Root {
        /// Directory to hash
        dir: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

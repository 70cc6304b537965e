//! Command-line interface definitions for namedupe.
//!
//! # Example
//!
//! ```bash
//! # Preview what would be removed in the current directory
//! namedupe --dry-run
//!
//! # Include "x.copy.txt" / "x - copy.txt" and walk subdirectories
//! namedupe ~/Downloads --copy --recursive
//!
//! # Custom marker pattern, no prompt, JSON report
//! namedupe ~/Pictures -p '_\d+$' --yes --output json
//! ```

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::scanner::TimeSource;

/// Find files whose names mark them as copies and delete all but the oldest.
///
/// Files are grouped per directory by their name with duplicate markers such
/// as " (1)" removed. The oldest file of each group is kept.
#[derive(Debug, Parser)]
#[command(name = "namedupe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Report what would be deleted without deleting anything
    #[arg(short, long)]
    pub dry_run: bool,

    /// Regular expression matching numeric duplicate markers [default: \s*\(\d+\)]
    #[arg(short, long, value_name = "REGEX")]
    pub pattern: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Also treat ".copy" and " - copy" name endings as duplicate markers
    #[arg(short, long)]
    pub copy: bool,

    /// Scan subdirectories too (files are only grouped within one directory)
    #[arg(short, long)]
    pub recursive: bool,

    /// Timestamp used to pick the file to keep [default: created]
    #[arg(long, value_enum, value_name = "SOURCE")]
    pub time: Option<TimeSourceArg>,

    /// Follow symbolic links to files and directories
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Report format [default: text]
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Read settings from this TOML file instead of the default location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Report format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable report
    #[default]
    Text,
    /// JSON document for scripting
    Json,
    /// One CSV row per file to delete
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Timestamp source as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimeSourceArg {
    /// Creation time (modification time where unavailable)
    Created,
    /// Last modification time
    Modified,
}

impl From<TimeSourceArg> for TimeSource {
    fn from(arg: TimeSourceArg) -> Self {
        match arg {
            TimeSourceArg::Created => TimeSource::Created,
            TimeSourceArg::Modified => TimeSource::Modified,
        }
    }
}

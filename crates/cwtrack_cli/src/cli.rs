//! Command line definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Compliance due-date tracking tools
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a compliance history file and print each computed schedule
    Replay(ReplayArgs),

    /// Print crate versions
    Version,
}

/// Output rendering for `replay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// History file (YAML or JSON)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", env = "CWTRACK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Absolute log directory (overrides config)
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log level (overrides config)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Adjustment policy: sticky or reset (overrides config)
    #[arg(long, value_name = "POLICY")]
    pub adjustment_policy: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

//! CLI argument parsing for the despertar trace replayer

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the engine dump
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "despertar")]
#[command(version)]
#[command(about = "Replay wakeup and activity traces through the wakeup attribution engine", long_about = None)]
pub struct Cli {
    /// JSON-lines trace of wakeup and activity events
    #[arg(value_name = "TRACE")]
    pub trace: PathBuf,

    /// Device → subsystem table (TOML); defaults to the embedded table
    #[arg(short = 's', long = "subsystems", value_name = "FILE")]
    pub subsystems: Option<PathBuf>,

    /// Engine configuration (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the matching half-window in milliseconds
    #[arg(short = 'w', long = "window", value_name = "MS")]
    pub window: Option<i64>,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

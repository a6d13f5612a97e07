//! Errors for configuration, subsystem table and trace loading
//!
//! The attribution engine itself never fails: malformed wakeup reasons,
//! unknown devices and unmatched activity are all handled locally. Only the
//! surfaces that read external input (TOML files, replay traces) return
//! these errors.

use thiserror::Error;

/// Errors that can occur while loading tables, configuration or traces
#[derive(Error, Debug)]
pub enum DespertarError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("Duplicate subsystem {what} '{value}' in subsystem table")]
    DuplicateSubsystem { what: &'static str, value: String },

    #[error("Subsystem '{0}' uses the reserved UNKNOWN id")]
    ReservedSubsystem(String),

    #[error("Invalid trace event on line {line}: {message}")]
    Trace { line: usize, message: String },
}

/// Result type for fallible loading operations
pub type Result<T> = std::result::Result<T, DespertarError>;

//! Error types for ttsdiag

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for ttsdiag
///
/// Diagnostic checks never let these escape; each one is caught where it
/// happens and turned into a tagged outcome for the report.
#[derive(Error, Debug)]
pub enum DiagError {
    #[error("{0} not found")]
    ToolNotFound(String),

    #[error("{program} timed out after {}s", .after.as_secs())]
    TimedOut { program: String, after: Duration },

    #[error("{program} exited with {}: {stderr}", describe_status(.code))]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("output file {} is missing or empty", .0.display())]
    EmptyOutput(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Render an exit code the way the report prints it
fn describe_status(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {}", c),
        None => "a signal".to_string(),
    }
}

/// Result type alias for ttsdiag operations
pub type Result<T> = std::result::Result<T, DiagError>;

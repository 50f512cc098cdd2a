//! Error types for rdcli
//!
//! Provides user-friendly error messages for the failures a terminal
//! session can hit: malformed input, driver rejections, readline and
//! filesystem trouble.

use crate::driver::DriverError;
use crate::tokenizer::SyntaxError;
use std::fmt;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug)]
pub enum CliError {
    /// Error reported by the backend driver
    Driver(DriverError),

    /// Malformed quoting in an input line
    Syntax(SyntaxError),

    /// Invalid command shape (e.g. empty command)
    ParseError(String),

    /// Configuration file error
    ConfigurationError(String),

    /// Readline error
    ReadlineError(String),

    /// File I/O error
    IoError(String),

    /// User cancelled operation
    Cancelled,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Driver(err) => write!(f, "{}", err),
            CliError::Syntax(err) => write!(f, "{}", err),
            CliError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            CliError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ReadlineError(msg) => write!(f, "Input error: {}", msg),
            CliError::IoError(msg) => write!(f, "File error: {}", msg),
            CliError::Cancelled => write!(f, "Operation cancelled"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<DriverError> for CliError {
    fn from(err: DriverError) -> Self {
        CliError::Driver(err)
    }
}

impl From<SyntaxError> for CliError {
    fn from(err: SyntaxError) -> Self {
        CliError::Syntax(err)
    }
}

impl From<rustyline::error::ReadlineError> for CliError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        match err {
            rustyline::error::ReadlineError::Interrupted => CliError::Cancelled,
            rustyline::error::ReadlineError::Eof => CliError::Cancelled,
            e => CliError::ReadlineError(e.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        CliError::ConfigurationError(format!("TOML parse error: {}", err))
    }
}

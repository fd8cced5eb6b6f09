//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while parsing a matched log line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed timestamp: {0:?}")]
    MalformedTimestamp(String),
}

/// Errors that can occur while scanning a single log source
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Could not open {} for reading: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while building the scan configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Slow threshold must be a positive number of seconds, got {0}")]
    InvalidThreshold(f64),
}

/// Errors that can occur while locating log files
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Invalid log file pattern {pattern}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("No log files match {0}")]
    NoSources(String),
}

/// Errors that can occur during output rendering
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

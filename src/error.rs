//! Error types for the distribution pipeline.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DistError {
    /// File system errors, tagged with the path that failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal errors
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid rule pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid glob '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Unknown document type: {0}")]
    UnknownDocumentType(String),
}

impl DistError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DistError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience Result type using DistError
pub type Result<T> = std::result::Result<T, DistError>;

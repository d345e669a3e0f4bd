//! Error types for snippet analysis

use std::path::PathBuf;
use thiserror::Error;

/// Result type for snippet operations
pub type Result<T> = std::result::Result<T, SnippetError>;

/// Snippet analysis errors
#[derive(Error, Debug)]
pub enum SnippetError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Snippet not found: {name}")]
    UnknownSnippet { name: String, suggestions: Vec<String> },

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

//! Errors for configuration loading, persistence and editing.

use std::path::PathBuf;

/// Errors that can occur while loading, saving or editing the site config.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
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

    #[error("Invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Unknown theme: {0}")]
    UnknownTheme(String),
}

/// Errors from reading a pasted comments embed snippet.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SnippetError {
    #[error("No giscus client script found in the pasted snippet")]
    NoScript,
}

//! Error types for remote dataset fetching.

use thiserror::Error;

/// Errors produced while fetching remote datasets.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("response from {url} is not valid UTF-8 text")]
    NotText { url: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("network error: {0}")]
    Network(String),
}

/// Result alias for cloud operations.
pub type Result<T> = std::result::Result<T, CloudError>;

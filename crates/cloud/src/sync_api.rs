//! Blocking (synchronous) API.
//!
//! Wraps the async [`HttpClient`] with a Tokio runtime so callers such as
//! the CLI don't need to manage their own async runtime.

use crate::error::{CloudError, Result};
use crate::http::{FetchOptions, HttpClient};
use std::path::Path;

/// Blocking wrapper around [`HttpClient`].
///
/// Uses an internal single-threaded Tokio runtime.
pub struct HttpClientBlocking {
    rt: tokio::runtime::Runtime,
    inner: HttpClient,
}

impl HttpClientBlocking {
    /// Create a new blocking client.
    pub fn new(options: &FetchOptions) -> Result<Self> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| CloudError::Network(e.to_string()))?;

        let inner = HttpClient::new(options)?;
        Ok(Self { rt, inner })
    }

    /// Fetch a remote file as raw bytes (blocking).
    pub fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.rt.block_on(self.inner.fetch_bytes(url))
    }

    /// Fetch a remote file as UTF-8 text (blocking).
    pub fn fetch_text(&self, url: &str) -> Result<String> {
        self.rt.block_on(self.inner.fetch_text(url))
    }

    /// Fetch a remote file to disk (blocking). Returns bytes written.
    pub fn fetch_to_file(&self, url: &str, path: &Path) -> Result<u64> {
        self.rt.block_on(self.inner.fetch_to_file(url, path))
    }
}

/// One-shot convenience: download a remote dataset as text.
pub fn fetch_text(url: &str, options: &FetchOptions) -> Result<String> {
    HttpClientBlocking::new(options)?.fetch_text(url)
}

/// One-shot convenience: download a remote dataset to disk.
pub fn fetch_to_file(url: &str, path: &Path, options: &FetchOptions) -> Result<u64> {
    HttpClientBlocking::new(options)?.fetch_to_file(url, path)
}

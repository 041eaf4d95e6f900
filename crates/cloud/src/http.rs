//! HTTP client wrapper with retry logic.
//!
//! Datasets are fetched whole (they are small CSV and GeoJSON files), with
//! a per-request timeout and exponential backoff on timeout/connect
//! failures. Non-success status codes are surfaced, not retried.

use crate::error::{CloudError, Result};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;

/// Options for dataset fetching.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries after the first attempt (timeout/connect errors only).
    pub max_retries: u32,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }
}

/// HTTP client for downloading remote datasets.
pub struct HttpClient {
    client: Client,
    max_retries: u32,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(options: &FetchOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(concat!("placegis/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            max_retries: options.max_retries,
        })
    }

    /// Fetch a remote file as raw bytes.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self.execute_with_retry(self.client.get(url)).await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CloudError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = resp.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// Fetch a remote file as UTF-8 text (a CSV or GeoJSON dataset).
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let bytes = self.fetch_bytes(url).await?;
        String::from_utf8(bytes).map_err(|_| CloudError::NotText {
            url: url.to_string(),
        })
    }

    /// Fetch a remote file and write it to `path`.
    ///
    /// Returns the number of bytes written.
    pub async fn fetch_to_file(&self, url: &str, path: &Path) -> Result<u64> {
        let bytes = self.fetch_bytes(url).await?;
        std::fs::write(path, &bytes)?;
        Ok(bytes.len() as u64)
    }

    /// Execute a request with exponential backoff retry.
    async fn execute_with_retry(
        &self,
        request: reqwest::RequestBuilder,
    ) -> std::result::Result<reqwest::Response, reqwest::Error> {
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff_ms = 100u64 * 2u64.pow(attempt - 1);
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }

            match request.try_clone() {
                Some(cloned) => match cloned.send().await {
                    Ok(resp) => return Ok(resp),
                    Err(e) if e.is_timeout() || e.is_connect() => {
                        last_err = Some(e);
                        continue;
                    }
                    Err(e) => return Err(e),
                },
                None => {
                    return request.send().await;
                }
            }
        }

        Err(last_err.unwrap())
    }
}

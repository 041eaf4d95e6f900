//! # PlaceGis Cloud
//!
//! Remote dataset access for PlaceGis. The tutorial datasets (places CSV,
//! trips CSV, boundary polygons) live behind fixed HTTP URLs; this crate
//! downloads them with timeouts and bounded exponential-backoff retries.
//!
//! The async [`HttpClient`] is the primary API; the [`blocking`] module
//! wraps it in a current-thread Tokio runtime for synchronous callers such
//! as the CLI.

pub mod error;
pub mod http;
pub mod sync_api;

pub use error::{CloudError, Result};
pub use http::{FetchOptions, HttpClient};

/// Blocking API re-exported as `blocking` module.
pub mod blocking {
    pub use crate::sync_api::*;
}

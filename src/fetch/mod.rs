//! Content fetching collaborator.
//!
//! The filesystem core never touches the network directly. It builds fully
//! formed URLs and hands them to a [`ContentFetcher`], interpreting only the
//! outcome: text, a local file path, or one of the [`FetchError`] variants.

pub mod http;
pub mod memory;

pub use http::HttpFetcher;
pub use memory::StaticFetcher;

use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by a [`ContentFetcher`]
#[derive(Debug, Error)]
pub enum FetchError {
    /// The remote responded 404
    #[error("Resource not found: {url}")]
    NotFound { url: String },

    /// Any other non-2xx status
    #[error("HTTP request failed with status {status} for URL: {url}")]
    Http { status: u16, url: String },

    /// Connectivity failure, timeout, or an unreadable body
    #[error("Request to {url} failed: {message}")]
    Network { url: String, message: String },

    /// Local cache could not be written or read
    #[error("Cache IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for content fetchers
/// Implementations own transport, timeouts, retries, and file caching
pub trait ContentFetcher: Send + Sync {
    /// Fetch a listing document as text
    fn fetch_text(&self, url: &str) -> Result<String, FetchError>;

    /// Fetch file bytes and return a path to a readable local copy
    fn fetch_and_cache_file(&self, url: &str) -> Result<PathBuf, FetchError>;
}

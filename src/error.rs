//! Error taxonomy for the catalog.
//!
//! Extraction code recovers from small irregularities locally (skipped menu
//! items, defaulted tdoc ranges). Only the structural absence of something the
//! page must contain, or a key that resolves to nothing, surfaces here.

use thiserror::Error;

/// Failure reported by a [`PageFetcher`](crate::fetcher::PageFetcher).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} returned a body that is not valid UTF-8")]
    Decode { url: String },
}

/// Errors surfaced by the catalog controller and its extractors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The page lacks an anchor it must contain, or could not be fetched at all.
    #[error("page format is not correct ({reason}); url is {url}")]
    PageFormat { url: String, reason: String },

    /// The key has no resolvable data after a successful fetch.
    #[error("resource not found: {key} ({reason})")]
    NotFound { key: String, reason: String },

    #[error("cache store error at {path}: {message}")]
    Cache { path: String, message: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl CatalogError {
    pub fn page_format(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PageFormat {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NotFound {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Map a transport failure for `url` into a page-format failure.
    pub fn from_fetch(url: &str, err: FetchError) -> Self {
        Self::page_format(url, format!("fetch failed: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

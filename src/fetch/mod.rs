// src/fetch/mod.rs
// =============================================================================
// The page fetcher: the only part of the crawler that touches the network.
//
// The crawl engine never talks to reqwest directly. It only sees the
// PageFetcher trait, so tests can hand it an in-memory site instead.
//
// Submodules:
// - http: the real implementation (reqwest + scraper)
//
// Rust concepts:
// - Traits: an interface the crawl session is generic over
// - async-trait: async methods on traits, usable behind Arc<F>
// =============================================================================

mod http;

pub use http::HttpFetcher;

use async_trait::async_trait;
use thiserror::Error;

// Everything the crawl step needs to know about one fetched page.
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    /// HTTP status code of the final response
    pub status: u16,
    /// Raw response body
    pub body: String,
    /// Raw href values of every <a href> on the page, in document order
    pub anchors: Vec<String>,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),
}

// Fetches one URL. Any error means "no content, no links" to the caller.
#[async_trait]
pub trait PageFetcher: Send + Sync + 'static {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

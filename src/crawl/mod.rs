// src/crawl/mod.rs
// =============================================================================
// This module is the crawl engine.
//
// Submodules:
// - state: visited URLs, collected emails and counters shared by all tasks
// - page: the single-page step (fetch, extract emails, filter links)
// - session: owns everything for one crawl and runs a traversal strategy
//
// Rust concepts:
// - Arc: shared ownership between concurrent page tasks
// - Generics: the session works with any PageFetcher
// =============================================================================

mod page;
mod session;
mod state;

#[cfg(test)]
mod testing;

pub use session::{CrawlSession, CrawlSummary, Strategy};

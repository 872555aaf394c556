// src/crawl/page.rs
// =============================================================================
// The single-page crawl step.
//
// Given one URL it:
// 1. Skips static assets without fetching them
// 2. Waits for the courtesy delay, if one is configured
// 3. Fetches the page (a failure just means "nothing found here")
// 4. Extracts emails and hands the new ones to the session and the sink
// 5. Turns every href into an absolute URL and keeps the ones that stay on
//    the seed's host and within the depth limit
//
// The returned links are deduplicated but NOT yet checked against the
// visited set; that is the session's job.
// =============================================================================

use super::state::SharedState;
use crate::config::CrawlOptions;
use crate::extract::{dedupe, emails_in};
use crate::fetch::PageFetcher;
use crate::sink::EmailSender;
use crate::urls::{
    get_base_url, is_asset, is_same_domain, relative_to_absolute, remove_anchor,
    remove_query_param, url_depth,
};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

// Hrefs that never lead to a crawlable page.
const SKIPPED_SCHEMES: &[&str] = &["mailto:", "tel:", "javascript:", "data:"];

pub struct PageCrawler<F> {
    options: Arc<CrawlOptions>,
    fetcher: Arc<F>,
    state: Arc<SharedState>,
    sink: Option<EmailSender>,
}

// Manual impl: cloning only bumps the Arcs, F itself need not be Clone.
impl<F> Clone for PageCrawler<F> {
    fn clone(&self) -> Self {
        Self {
            options: Arc::clone(&self.options),
            fetcher: Arc::clone(&self.fetcher),
            state: Arc::clone(&self.state),
            sink: self.sink.clone(),
        }
    }
}

impl<F: PageFetcher> PageCrawler<F> {
    pub fn new(
        options: Arc<CrawlOptions>,
        fetcher: Arc<F>,
        state: Arc<SharedState>,
        sink: Option<EmailSender>,
    ) -> Self {
        Self {
            options,
            fetcher,
            state,
            sink,
        }
    }

    // Crawls a single page.
    //
    // Parameters:
    //   url: absolute URL to fetch (the seed or an admitted link)
    //
    // Returns: same-domain links found on the page, absolute, deduplicated,
    // within the depth limit. Empty for assets and failed fetches.
    pub async fn crawl_page(&self, url: &str) -> Vec<String> {
        // Static files are never downloaded
        if is_asset(url) {
            debug!(url = %url, "skipping asset");
            return Vec::new();
        }

        // Courtesy delay, so we don't hammer the server
        if let Some(delay) = self.options.request_delay {
            debug!(url = %url, delay_ms = delay.as_millis() as u64, "sleeping before request");
            tokio::time::sleep(delay).await;
        }

        // A fetch error is not fatal: this page just contributes nothing
        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(err) => {
                warn!(url = %url, error = %err, "fetch failed");
                return Vec::new();
            }
        };

        self.state.page_crawled();
        info!(url = %url, status = page.status, "crawled page");

        // Emails: extract -> filter file names -> dedupe, then hand them to
        // the shared state (which forwards new ones to the sink)
        let emails = emails_in(&page.body);
        if !emails.is_empty() {
            self.state.page_had_emails();
            info!(url = %url, count = emails.len(), "found emails");
            for email in &emails {
                debug!(url = %url, email = %email, "email");
            }
        }
        self.state.record_emails(emails, self.sink.as_ref()).await;

        // Links: resolve every href and keep the ones we may crawl
        let base_url = get_base_url(url);
        let links = page
            .anchors
            .iter()
            .filter_map(|href| self.accept_link(href, url, &base_url))
            .collect();

        dedupe(links)
    }

    // Resolves one href and applies the domain and depth filters.
    fn accept_link(&self, href: &str, current_url: &str, base_url: &str) -> Option<String> {
        if is_skipped_href(href) {
            trace!(href = %href, "skipping non-page href");
            return None;
        }

        let mut link = relative_to_absolute(href, current_url, base_url);
        if self.options.ignore_queries {
            link = remove_query_param(&link);
        }
        let link = remove_anchor(&link);

        if !is_same_domain(&self.options.seed_url, &link) {
            trace!(link = %link, "rejected: other domain");
            return None;
        }

        if let Some(max_depth) = self.options.max_depth {
            match url_depth(&link, &self.options.seed_url) {
                None | Some(0) => {
                    trace!(link = %link, "rejected: at or outside the seed path");
                    return None;
                }
                Some(depth) if depth > max_depth => {
                    trace!(link = %link, depth, max_depth, "rejected: too deep");
                    return None;
                }
                Some(_) => {}
            }
        }

        Some(link)
    }
}

fn is_skipped_href(href: &str) -> bool {
    if href.is_empty() || href.starts_with('#') {
        return true;
    }
    let lower = href.to_ascii_lowercase();
    SKIPPED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}

// src/fetch/http.rs
// =============================================================================
// The real page fetcher: downloads a page with reqwest and collects the
// href of every <a> tag with scraper.
//
// One Client is built up front and shared by every request, so connection
// pooling works even when many pages are fetched at once.
// =============================================================================

use super::{FetchError, FetchedPage, PageFetcher};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Builds the shared HTTP client.
    //
    // Parameters:
    //   timeout: per-request timeout (connect + body)
    //   user_agent: sent with every request
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let anchors = extract_anchors(&body);

        Ok(FetchedPage {
            status: status.as_u16(),
            body,
            anchors,
        })
    }
}

// Raw href values, unresolved. The crawl step decides what they mean.
//
// Kept out of the async fn because scraper's Html is not Send.
fn extract_anchors(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string())
        .collect()
}

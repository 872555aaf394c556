// In-memory site used by the crawl tests.

use crate::fetch::{FetchError, FetchedPage, PageFetcher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct FakeSite {
    pages: HashMap<String, FetchedPage>,
    fetched: Mutex<Vec<String>>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: &str, anchors: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            FetchedPage {
                status: 200,
                body: body.to_string(),
                anchors: anchors.iter().map(|a| a.to_string()).collect(),
            },
        );
        self
    }

    // Every URL passed to fetch(), in call order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FakeSite {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.fetched.lock().unwrap().push(url.to_string());
        tokio::task::yield_now().await;
        self.pages.get(url).cloned().ok_or(FetchError::Status(404))
    }
}

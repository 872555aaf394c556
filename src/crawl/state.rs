// src/crawl/state.rs
// =============================================================================
// State shared by every page task of one crawl session.
//
// What lives here:
// - visited: every URL admitted for crawling, in admission order
// - collected: the email list, filled ONLY when an output file is set
// - found: every distinct address seen, for the summary when there is no
//   output file; it never affects admission
// - counters: pages fetched, pages that had at least one email
//
// The lists share one lock, so the parallel strategy can never race on
// them. Limits are checked before anything is inserted: the visited and
// collected lists never grow past their limits.
//
// The email limit only exists together with an output file. Without one
// nothing is collected, so the email limit never stops the crawl.
//
// The seed URL is remembered as "seen" but is not counted as visited, so
// a URL limit of N allows N pages beyond the seed.
//
// Rust concepts:
// - tokio::sync::Mutex: a lock that can be awaited instead of blocking
// - Atomics: counters bumped from many tasks without a lock
// =============================================================================

use crate::sink::EmailSender;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

// Outcome of offering a discovered URL to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    AlreadyVisited,
    UrlLimitReached,
    EmailLimitReached,
}

#[derive(Debug, Default)]
struct Inner {
    visited: Vec<String>,
    seen_urls: HashSet<String>,
    collected: Vec<String>,
    found: Vec<String>,
    seen_emails: HashSet<String>,
}

#[derive(Debug)]
pub struct SharedState {
    inner: Mutex<Inner>,
    urls_crawled: AtomicUsize,
    urls_with_emails: AtomicUsize,
    limit_urls: usize,
    limit_emails: usize,
    collect_emails: bool,
}

impl SharedState {
    // Parameters:
    //   seed_url: marked seen up front so it is never crawled twice
    //   limit_urls: maximum number of visited URLs (seed excluded)
    //   limit_emails: maximum number of collected emails
    //   collect_emails: true when the session has an output file
    pub fn new(
        seed_url: &str,
        limit_urls: usize,
        limit_emails: usize,
        collect_emails: bool,
    ) -> Self {
        let mut inner = Inner::default();
        inner.seen_urls.insert(seed_url.to_string());

        Self {
            inner: Mutex::new(inner),
            urls_crawled: AtomicUsize::new(0),
            urls_with_emails: AtomicUsize::new(0),
            limit_urls,
            limit_emails,
            collect_emails,
        }
    }

    // Marks `url` visited if every limit still allows it.
    //
    // Parameters:
    //   url: an absolute, already filtered link from the page step
    //
    // Returns:
    //   Accepted          -> url is now visited, crawl it
    //   AlreadyVisited    -> seen before (or the seed), skip it
    //   UrlLimitReached   -> stop expanding
    //   EmailLimitReached -> stop expanding (only with an output file)
    //
    // Limits are checked first, then duplicates, same order for both strategies.
    pub async fn admit(&self, url: &str) -> Admission {
        let mut inner = self.inner.lock().await;

        if inner.visited.len() >= self.limit_urls {
            return Admission::UrlLimitReached;
        }
        if self.collect_emails && inner.collected.len() >= self.limit_emails {
            return Admission::EmailLimitReached;
        }
        if !inner.seen_urls.insert(url.to_string()) {
            return Admission::AlreadyVisited;
        }

        inner.visited.push(url.to_string());
        Admission::Accepted
    }

    // Takes the addresses found on one page.
    //
    // With an output file, new addresses are collected up to the email
    // limit and each one is forwarded to the sink. Without one, they only
    // go to the display list.
    //
    // Returns how many addresses were new to the session.
    pub async fn record_emails(&self, emails: Vec<String>, sink: Option<&EmailSender>) -> usize {
        let mut inner = self.inner.lock().await;
        let mut added = 0;

        for email in emails {
            if inner.seen_emails.contains(&email) {
                continue;
            }

            if self.collect_emails {
                if inner.collected.len() >= self.limit_emails {
                    break;
                }
                // submitting under the lock keeps the file in list order
                if let Some(sink) = sink {
                    sink.submit(email.clone());
                }
                inner.collected.push(email.clone());
            } else {
                inner.found.push(email.clone());
            }

            inner.seen_emails.insert(email);
            added += 1;
        }

        added
    }

    pub async fn email_limit_reached(&self) -> bool {
        self.collect_emails && self.inner.lock().await.collected.len() >= self.limit_emails
    }

    pub fn page_crawled(&self) {
        self.urls_crawled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn page_had_emails(&self) {
        self.urls_with_emails.fetch_add(1, Ordering::Relaxed);
    }

    pub fn urls_crawled(&self) -> usize {
        self.urls_crawled.load(Ordering::Relaxed)
    }

    pub fn urls_with_emails(&self) -> usize {
        self.urls_with_emails.load(Ordering::Relaxed)
    }

    pub async fn visited(&self) -> Vec<String> {
        self.inner.lock().await.visited.clone()
    }

    // The collected list with an output file, every address found otherwise.
    pub async fn emails(&self) -> Vec<String> {
        let inner = self.inner.lock().await;
        if self.collect_emails {
            inner.collected.clone()
        } else {
            inner.found.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_admit_marks_each_url_once() {
        let state = SharedState::new("https://a.com/", 10, 10, false);

        assert_eq!(state.admit("https://a.com/x").await, Admission::Accepted);
        assert_eq!(state.admit("https://a.com/x").await, Admission::AlreadyVisited);
        assert_eq!(state.admit("https://a.com/").await, Admission::AlreadyVisited);
        assert_eq!(state.visited().await, strings(&["https://a.com/x"]));
    }

    #[tokio::test]
    async fn test_admit_respects_url_limit() {
        let state = SharedState::new("https://a.com/", 2, 10, false);

        assert_eq!(state.admit("https://a.com/1").await, Admission::Accepted);
        assert_eq!(state.admit("https://a.com/2").await, Admission::Accepted);
        assert_eq!(state.admit("https://a.com/3").await, Admission::UrlLimitReached);
        // limit wins over the duplicate check
        assert_eq!(state.admit("https://a.com/1").await, Admission::UrlLimitReached);
        assert_eq!(state.visited().await.len(), 2);
    }

    #[tokio::test]
    async fn test_collected_emails_are_capped_and_deduplicated() {
        let state = SharedState::new("https://a.com/", 10, 2, true);

        let added = state
            .record_emails(strings(&["x@a.com", "x@a.com", "y@a.com", "z@a.com"]), None)
            .await;
        assert_eq!(added, 2);
        assert_eq!(state.emails().await, strings(&["x@a.com", "y@a.com"]));
        assert!(state.email_limit_reached().await);
        assert_eq!(state.admit("https://a.com/more").await, Admission::EmailLimitReached);
    }

    #[tokio::test]
    async fn test_email_limit_ignored_without_output_file() {
        let state = SharedState::new("https://a.com/", 10, 1, false);

        let added = state
            .record_emails(strings(&["x@a.com", "y@a.com", "x@a.com"]), None)
            .await;
        assert_eq!(added, 2);
        assert_eq!(state.emails().await, strings(&["x@a.com", "y@a.com"]));
        assert!(!state.email_limit_reached().await);
        assert_eq!(state.admit("https://a.com/more").await, Admission::Accepted);
    }

    #[tokio::test]
    async fn test_counters() {
        let state = SharedState::new("https://a.com/", 10, 10, false);
        state.page_crawled();
        state.page_crawled();
        state.page_had_emails();
        assert_eq!(state.urls_crawled(), 2);
        assert_eq!(state.urls_with_emails(), 1);
    }
}

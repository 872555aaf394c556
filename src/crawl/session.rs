// src/crawl/session.rs
// =============================================================================
// A crawl session owns everything one crawl needs: the options, the
// fetcher, the shared state and (optionally) the email sink.
//
// Two traversal strategies share the same page step and the same admission
// rules (URL limit, email limit, already visited):
//
// - Sequential: depth-first recursion, one fetch in flight at a time.
// - Parallel: a frontier queue drained by at most `concurrency` page tasks.
//   The session is done when the queue is empty and no task is running.
//
// Rust concepts:
// - BoxFuture: async recursion needs a boxed, sized future
// - JoinSet: a group of spawned tasks we can await one by one
// =============================================================================

use super::page::PageCrawler;
use super::state::{Admission, SharedState};
use crate::config::CrawlOptions;
use crate::fetch::PageFetcher;
use crate::sink::{EmailSink, SinkError};
use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Sequential,
    Parallel,
}

// What a finished crawl reports back.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlSummary {
    pub seed_url: String,
    pub strategy: Strategy,
    /// Distinct URLs marked visited, not counting the seed
    pub urls_visited: usize,
    /// Pages fetched successfully
    pub urls_crawled: usize,
    /// Pages that contained at least one email
    pub urls_with_emails: usize,
    /// Collected addresses with an output file, every address found otherwise
    pub emails: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    /// Lines written by the sink (0 without an output file)
    pub emails_written: usize,
    pub elapsed_ms: u64,
}

pub struct CrawlSession<F> {
    options: Arc<CrawlOptions>,
    state: Arc<SharedState>,
    crawler: PageCrawler<F>,
    sink: Option<EmailSink>,
}

impl<F: PageFetcher> CrawlSession<F> {
    // Opens the output file (if any) and wires up the shared state.
    //
    // Parameters:
    //   options: validated crawl options (seed, limits, output file, ...)
    //   fetcher: the page fetcher, shared by every page task
    //
    // Returns: a session ready to run, or SinkError when the output file
    // cannot be created. Nothing has been fetched at that point.
    pub async fn start(options: CrawlOptions, fetcher: Arc<F>) -> Result<Self, SinkError> {
        let sink = match &options.output_file {
            Some(path) => Some(EmailSink::start(path).await?),
            None => None,
        };

        // emails are only collected (and limited) when they are persisted
        let options = Arc::new(options);
        let state = Arc::new(SharedState::new(
            &options.seed_url,
            options.limit_urls,
            options.limit_emails,
            sink.is_some(),
        ));
        let crawler = PageCrawler::new(
            Arc::clone(&options),
            fetcher,
            Arc::clone(&state),
            sink.as_ref().map(EmailSink::sender),
        );

        Ok(Self {
            options,
            state,
            crawler,
            sink,
        })
    }

    // Crawls from the seed URL until the frontier runs dry or a limit is
    // hit, then closes the sink and reports.
    //
    // Parameters:
    //   strategy: Sequential (depth-first, one fetch at a time) or
    //             Parallel (frontier queue, `concurrency` tasks at most)
    //
    // Returns: the CrawlSummary. The session is consumed; the output file
    // is fully written by the time this returns.
    pub async fn run(self, strategy: Strategy) -> CrawlSummary {
        let started = Instant::now();
        let seed = self.options.seed_url.clone();

        info!(seed = %seed, ?strategy, "starting crawl");

        match strategy {
            Strategy::Sequential => self.crawl_recursive(seed).await,
            Strategy::Parallel => self.crawl_parallel(seed).await,
        }

        self.finish(strategy, started).await
    }

    // Depth-first: crawl one page, then recurse into each admitted link
    // before looking at the next one.
    fn crawl_recursive(&self, url: String) -> BoxFuture<'_, ()> {
        async move {
            let links = self.crawler.crawl_page(&url).await;

            for link in links {
                match self.state.admit(&link).await {
                    Admission::Accepted => self.crawl_recursive(link).await,
                    Admission::AlreadyVisited => continue,
                    limit => {
                        debug!(url = %url, ?limit, "limit reached, not expanding further");
                        break;
                    }
                }
            }
        }
        .boxed()
    }

    // Frontier pool: keep up to `concurrency` page tasks running, feed the
    // links they return back into the queue, stop when both are empty.
    async fn crawl_parallel(&self, seed: String) {
        let mut frontier = VecDeque::from([seed]);
        let mut tasks: JoinSet<Vec<String>> = JoinSet::new();

        loop {
            // Fill the free slots from the front of the queue
            while tasks.len() < self.options.concurrency {
                let Some(url) = frontier.pop_front() else {
                    break;
                };
                if self.state.email_limit_reached().await {
                    debug!(dropped = frontier.len() + 1, "email limit reached, dropping frontier");
                    frontier.clear();
                    break;
                }

                let crawler = self.crawler.clone();
                tasks.spawn(async move { crawler.crawl_page(&url).await });
            }

            // Nothing running and nothing queued: the crawl is done
            let Some(joined) = tasks.join_next().await else {
                break;
            };

            let links = match joined {
                Ok(links) => links,
                Err(err) => {
                    error!(error = %err, "page task failed");
                    continue;
                }
            };

            for link in links {
                match self.state.admit(&link).await {
                    Admission::Accepted => frontier.push_back(link),
                    Admission::AlreadyVisited => continue,
                    limit => {
                        debug!(?limit, "limit reached, not queueing further links");
                        break;
                    }
                }
            }
        }
    }

    async fn finish(self, strategy: Strategy, started: Instant) -> CrawlSummary {
        let Self {
            options,
            state,
            crawler,
            sink,
        } = self;

        // the crawler holds a sink sender; close() waits for every sender
        drop(crawler);

        let output_file = sink.as_ref().map(|s| s.path().display().to_string());
        let emails_written = match sink {
            Some(sink) => sink.close().await,
            None => 0,
        };

        let summary = CrawlSummary {
            seed_url: options.seed_url.clone(),
            strategy,
            urls_visited: state.visited().await.len(),
            urls_crawled: state.urls_crawled(),
            urls_with_emails: state.urls_with_emails(),
            emails: state.emails().await,
            output_file,
            emails_written,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            urls_visited = summary.urls_visited,
            urls_crawled = summary.urls_crawled,
            emails = summary.emails.len(),
            "crawl finished"
        );

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::FakeSite;
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    const SEED: &str = "https://site.test/";

    // seed -> page2, external; page2 -> seed, asset
    fn three_page_site() -> FakeSite {
        FakeSite::new()
            .page(
                SEED,
                "Questions? sales@site.test",
                &["/page2", "https://elsewhere.test/"],
            )
            .page(
                "https://site.test/page2",
                "support@site.test and again sales@site.test",
                &["/", "/logo.png"],
            )
            .page("https://elsewhere.test/", "ceo@elsewhere.test", &[])
    }

    async fn run(site: &Arc<FakeSite>, options: CrawlOptions, strategy: Strategy) -> CrawlSummary {
        CrawlSession::start(options, Arc::clone(site))
            .await
            .unwrap()
            .run(strategy)
            .await
    }

    fn as_set(values: &[String]) -> HashSet<&str> {
        values.iter().map(String::as_str).collect()
    }

    #[tokio::test]
    async fn test_sequential_three_page_site() {
        let site = Arc::new(three_page_site());
        let options = CrawlOptions::builder(SEED).depth(1).build().unwrap();

        let summary = run(&site, options, Strategy::Sequential).await;

        assert_eq!(site.fetched(), vec![SEED, "https://site.test/page2"]);
        assert_eq!(summary.emails, vec!["sales@site.test", "support@site.test"]);
        assert_eq!(summary.urls_crawled, 2);
        assert_eq!(summary.urls_with_emails, 2);
        // page2 and the asset were both marked visited
        assert_eq!(summary.urls_visited, 2);
        assert_eq!(summary.emails_written, 0);
    }

    #[tokio::test]
    async fn test_parallel_three_page_site() {
        let site = Arc::new(three_page_site());
        let options = CrawlOptions::builder(SEED)
            .depth(1)
            .concurrency(4)
            .build()
            .unwrap();

        let summary = run(&site, options, Strategy::Parallel).await;

        let fetched = site.fetched();
        assert_eq!(as_set(&fetched), HashSet::from([SEED, "https://site.test/page2"]));
        assert_eq!(fetched.len(), 2);
        assert_eq!(
            as_set(&summary.emails),
            HashSet::from(["sales@site.test", "support@site.test"])
        );
        assert_eq!(summary.strategy, Strategy::Parallel);
    }

    #[tokio::test]
    async fn test_url_limit_of_one() {
        for strategy in [Strategy::Sequential, Strategy::Parallel] {
            let site = Arc::new(
                FakeSite::new()
                    .page(SEED, "", &["/a", "/b", "/c"])
                    .page("https://site.test/a", "", &["/a/x", "/a/y"])
                    .page("https://site.test/b", "", &[])
                    .page("https://site.test/c", "", &[]),
            );
            let options = CrawlOptions::builder(SEED).limit_urls(1).build().unwrap();

            let summary = run(&site, options, strategy).await;

            assert_eq!(summary.urls_visited, 1, "{:?}", strategy);
            assert_eq!(site.fetched(), vec![SEED, "https://site.test/a"], "{:?}", strategy);
        }
    }

    #[tokio::test]
    async fn test_email_limit_stops_expansion() {
        for strategy in [Strategy::Sequential, Strategy::Parallel] {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("emails.txt");
            let site = Arc::new(three_page_site());
            let options = CrawlOptions::builder(SEED)
                .limit_emails(1)
                .output_file(Some(path.clone()))
                .build()
                .unwrap();

            let summary = run(&site, options, strategy).await;

            assert!(summary.emails.len() <= 1, "{:?}", strategy);
            assert_eq!(summary.emails, vec!["sales@site.test"], "{:?}", strategy);
            assert_eq!(site.fetched(), vec![SEED], "{:?}", strategy);
            assert_eq!(summary.emails_written, 1, "{:?}", strategy);
            let contents = tokio::fs::read_to_string(&path).await.unwrap();
            assert_eq!(contents, "sales@site.test\n", "{:?}", strategy);
        }
    }

    #[tokio::test]
    async fn test_email_limit_drops_queued_links() {
        for strategy in [Strategy::Sequential, Strategy::Parallel] {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("emails.txt");
            let site = Arc::new(
                FakeSite::new()
                    .page(SEED, "", &["/a", "/b"])
                    .page("https://site.test/a", "a@site.test x@site.test", &[])
                    .page("https://site.test/b", "b@site.test", &[]),
            );
            let options = CrawlOptions::builder(SEED)
                .limit_emails(1)
                .concurrency(1)
                .output_file(Some(path.clone()))
                .build()
                .unwrap();

            let summary = run(&site, options, strategy).await;

            // /b was queued before /a filled the email limit
            assert_eq!(site.fetched(), vec![SEED, "https://site.test/a"], "{:?}", strategy);
            assert_eq!(summary.emails, vec!["a@site.test"], "{:?}", strategy);
            let contents = tokio::fs::read_to_string(&path).await.unwrap();
            assert_eq!(contents, "a@site.test\n", "{:?}", strategy);
        }
    }

    #[tokio::test]
    async fn test_email_limit_needs_an_output_file() {
        for strategy in [Strategy::Sequential, Strategy::Parallel] {
            let site = Arc::new(
                FakeSite::new()
                    .page(SEED, "a@site.test", &["/p2"])
                    .page("https://site.test/p2", "b@site.test", &[]),
            );
            let options = CrawlOptions::builder(SEED).limit_emails(1).build().unwrap();

            let summary = run(&site, options, strategy).await;

            assert_eq!(site.fetched(), vec![SEED, "https://site.test/p2"], "{:?}", strategy);
            assert_eq!(summary.emails, vec!["a@site.test", "b@site.test"], "{:?}", strategy);
            assert_eq!(summary.emails_written, 0);
        }
    }

    #[tokio::test]
    async fn test_emails_written_to_output_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("emails.txt");
        let site = Arc::new(three_page_site());
        let options = CrawlOptions::builder(SEED)
            .depth(1)
            .output_file(Some(path.clone()))
            .build()
            .unwrap();

        let summary = run(&site, options, Strategy::Sequential).await;

        assert_eq!(summary.emails_written, 2);
        assert_eq!(summary.output_file, Some(path.display().to_string()));
        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "sales@site.test\nsupport@site.test\n");
    }

    #[tokio::test]
    async fn test_failed_fetch_does_not_stop_the_crawl() {
        for strategy in [Strategy::Sequential, Strategy::Parallel] {
            let site = Arc::new(
                FakeSite::new()
                    .page(SEED, "", &["/broken", "/ok"])
                    .page("https://site.test/ok", "ok@site.test", &[]),
            );
            let options = CrawlOptions::builder(SEED).build().unwrap();

            let summary = run(&site, options, strategy).await;

            assert_eq!(summary.urls_visited, 2);
            assert_eq!(summary.urls_crawled, 2);
            assert_eq!(summary.emails, vec!["ok@site.test"]);
        }
    }

    #[tokio::test]
    async fn test_cycles_are_visited_once() {
        for strategy in [Strategy::Sequential, Strategy::Parallel] {
            let site = Arc::new(
                FakeSite::new()
                    .page(SEED, "", &["/a", "/b"])
                    .page("https://site.test/a", "", &["/b", "/a", "https://site.test/"])
                    .page("https://site.test/b", "", &["/a"]),
            );
            let options = CrawlOptions::builder(SEED).concurrency(2).build().unwrap();

            run(&site, options, strategy).await;

            let fetched = site.fetched();
            assert_eq!(fetched.len(), 3, "{:?}", strategy);
            assert_eq!(
                as_set(&fetched),
                HashSet::from([SEED, "https://site.test/a", "https://site.test/b"])
            );
        }
    }

    #[tokio::test]
    async fn test_start_fails_when_output_cannot_be_created() {
        let dir = TempDir::new().unwrap();
        let options = CrawlOptions::builder(SEED)
            .output_file(Some(dir.path().join("missing").join("emails.txt")))
            .build()
            .unwrap();

        let result = CrawlSession::start(options, Arc::new(FakeSite::new())).await;
        assert!(result.is_err());
    }
}

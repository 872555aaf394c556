// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every flag maps one-to-one onto a CrawlOptions builder setter; clap only
// checks types, the builder checks meaning (valid URL, depth >= -1, ...).
//
// Rust concepts:
// - Derive macros: clap generates the parser from the struct
// - Option<T>: flags that may be absent
// =============================================================================

use crate::config::{
    CrawlOptions, CrawlOptionsBuilder, DEFAULT_CONCURRENCY, DEFAULT_LIMIT_EMAILS,
    DEFAULT_LIMIT_URLS, DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT,
};
use crate::crawl::Strategy;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "email-crawler",
    version,
    about = "Crawl a website and collect the email addresses it publishes",
    long_about = "email-crawler starts from a seed URL, follows links on the same host up to an \
                  optional depth, and writes every email address it finds to stdout and, \
                  optionally, to a file (one address per line)."
)]
pub struct Cli {
    /// Website URL to start from (e.g., https://example.com)
    pub url: String,

    /// Per-request timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout: u64,

    /// Pause before every request, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub sleep: u64,

    /// Strip query strings from discovered links
    #[arg(long)]
    pub ignore_queries: bool,

    /// Maximum link depth below the seed URL (-1 = unbounded)
    ///
    /// Depth is counted in path segments relative to the seed path:
    /// with a seed of https://a.com, /x is depth 1 and /x/y is depth 2.
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub depth: i64,

    /// Stop after this many distinct URLs (not counting the seed)
    #[arg(long, default_value_t = DEFAULT_LIMIT_URLS)]
    pub limit_urls: usize,

    /// Stop after this many distinct emails
    #[arg(long, default_value_t = DEFAULT_LIMIT_EMAILS)]
    pub limit_emails: usize,

    /// Append every new email to this file, one per line
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Crawl pages concurrently instead of one at a time
    #[arg(long)]
    pub parallel: bool,

    /// Pages fetched at once with --parallel
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Debug logging (RUST_LOG overrides this)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn strategy(&self) -> Strategy {
        if self.parallel {
            Strategy::Parallel
        } else {
            Strategy::Sequential
        }
    }

    // Not validated yet; call build() on the result.
    pub fn options(&self) -> CrawlOptionsBuilder {
        CrawlOptions::builder(self.url.clone())
            .timeout_ms(self.timeout)
            .delay_ms(self.sleep)
            .ignore_queries(self.ignore_queries)
            .depth(self.depth)
            .limit_urls(self.limit_urls)
            .limit_emails(self.limit_emails)
            .output_file(self.output.clone())
            .concurrency(self.concurrency)
            .user_agent(self.user_agent.clone())
    }
}


// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why allow_negative_numbers on --depth?
//    - clap treats "-1" as a flag by default
//    - This tells it a leading '-' followed by digits is a value
//
// 2. Why usize for the limits?
//    - Limits can never be negative, so the type rules it out
//    - clap reports "-1" as an invalid value before we ever see it
// -----------------------------------------------------------------------------

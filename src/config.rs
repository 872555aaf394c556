// src/config.rs
// =============================================================================
// Crawl configuration.
//
// CrawlOptions is immutable once built and can only be created through
// CrawlOptionsBuilder::build(), which validates everything up front. A bad
// option is the one error that stops us before any request is made.
//
// Rust concepts:
// - Builder pattern: chainable setters, one fallible build() at the end
// - thiserror: a typed error enum with readable messages
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_LIMIT_URLS: usize = 1000;
pub const DEFAULT_LIMIT_EMAILS: usize = 1000;
pub const DEFAULT_CONCURRENCY: usize = 16;
pub const DEFAULT_USER_AGENT: &str = concat!("email-crawler/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid seed URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),

    #[error("seed URL has no host: {0}")]
    MissingHost(String),

    #[error("depth must be -1 (unbounded) or greater, got {0}")]
    InvalidDepth(i64),

    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
}

#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Where the crawl starts; also the same-domain and depth reference
    pub seed_url: String,
    /// Per-fetch timeout
    pub timeout: Duration,
    /// Courtesy pause before every fetch
    pub request_delay: Option<Duration>,
    /// Strip query strings from discovered links
    pub ignore_queries: bool,
    /// None = unbounded
    pub max_depth: Option<usize>,
    /// Maximum distinct URLs marked visited (the seed is not counted)
    pub limit_urls: usize,
    /// Maximum distinct emails collected
    pub limit_emails: usize,
    /// Output file for the email sink
    pub output_file: Option<PathBuf>,
    /// Page tasks in flight at once for the parallel strategy
    pub concurrency: usize,
    pub user_agent: String,
}

impl CrawlOptions {
    pub fn builder(seed_url: impl Into<String>) -> CrawlOptionsBuilder {
        CrawlOptionsBuilder::new(seed_url)
    }
}

#[derive(Debug, Clone)]
pub struct CrawlOptionsBuilder {
    seed_url: String,
    timeout_ms: u64,
    delay_ms: u64,
    ignore_queries: bool,
    depth: i64,
    limit_urls: usize,
    limit_emails: usize,
    output_file: Option<PathBuf>,
    concurrency: usize,
    user_agent: String,
}

impl CrawlOptionsBuilder {
    fn new(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            delay_ms: 0,
            ignore_queries: false,
            depth: -1,
            limit_urls: DEFAULT_LIMIT_URLS,
            limit_emails: DEFAULT_LIMIT_EMAILS,
            output_file: None,
            concurrency: DEFAULT_CONCURRENCY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    pub fn delay_ms(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    pub fn ignore_queries(mut self, ignore: bool) -> Self {
        self.ignore_queries = ignore;
        self
    }

    // -1 means unbounded
    pub fn depth(mut self, depth: i64) -> Self {
        self.depth = depth;
        self
    }

    pub fn limit_urls(mut self, limit: usize) -> Self {
        self.limit_urls = limit;
        self
    }

    pub fn limit_emails(mut self, limit: usize) -> Self {
        self.limit_emails = limit;
        self
    }

    // An empty path means "no sink", same as never calling this.
    pub fn output_file(mut self, path: Option<PathBuf>) -> Self {
        self.output_file = path.filter(|p| !p.as_os_str().is_empty());
        self
    }

    pub fn concurrency(mut self, workers: usize) -> Self {
        self.concurrency = workers;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Result<CrawlOptions, ConfigError> {
        let parsed = Url::parse(&self.seed_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.seed_url.clone(),
            reason: e.to_string(),
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::UnsupportedScheme(parsed.scheme().to_string()));
        }
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingHost(self.seed_url));
        }

        let max_depth = match self.depth {
            -1 => None,
            d if d < -1 => return Err(ConfigError::InvalidDepth(d)),
            d => Some(d as usize),
        };

        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }

        Ok(CrawlOptions {
            seed_url: self.seed_url,
            timeout: Duration::from_millis(self.timeout_ms),
            request_delay: (self.delay_ms > 0).then(|| Duration::from_millis(self.delay_ms)),
            ignore_queries: self.ignore_queries,
            max_depth,
            limit_urls: self.limit_urls,
            limit_emails: self.limit_emails,
            output_file: self.output_file,
            concurrency: self.concurrency,
            user_agent: self.user_agent,
        })
    }
}

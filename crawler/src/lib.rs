//! Web crawler feeding a [`ConcurrentIndex`].

pub mod crawl;
pub mod fetch;
pub mod html;

pub use crawl::{index_page, CrawlReport, WebCrawler};
pub use fetch::{FetchError, Fetcher, HttpFetcher, Page};

use anyhow::Result;
use sift_core::{ConcurrentIndex, DEFAULT_THREADS};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Maximum number of pages fetched, including the seed.
    pub limit: usize,
    pub max_redirects: usize,
    /// Indexing workers.
    pub threads: usize,
    pub timeout: Duration,
    pub user_agent: String,
    /// Larger bodies are treated as failed fetches.
    pub max_bytes: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            limit: 50,
            max_redirects: 3,
            threads: DEFAULT_THREADS,
            timeout: Duration::from_secs(12),
            user_agent: "sift-bot/0.1".into(),
            max_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Crawl the web from `seed` over HTTP into `index`.
pub fn crawl(seed: &Url, index: &Arc<ConcurrentIndex>, config: &CrawlConfig) -> Result<CrawlReport> {
    let fetcher = HttpFetcher::new(config)?;
    let crawler = WebCrawler::new(fetcher, Arc::clone(index), config)?;
    Ok(crawler.crawl(seed))
}

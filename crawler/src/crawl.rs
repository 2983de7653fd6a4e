//! Breadth-first crawl with a page budget.
//!
//! The calling thread owns the frontier and does every fetch; parsing and indexing
//! of fetched pages run on the work queue. Each URL is fetched at most once, and
//! every fetch attempt counts against the budget.

use crate::fetch::Fetcher;
use crate::html::{extract_links, norm, strip_markup};
use crate::CrawlConfig;
use sift_core::tokenizer::stems;
use sift_core::{ConcurrentIndex, InvertedIndex, WorkQueue};
use std::collections::{HashSet, VecDeque};
use std::io;
use std::sync::Arc;
use url::Url;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Fetch attempts, successful or not.
    pub fetched: usize,
    pub failed: usize,
}

impl CrawlReport {
    /// Pages handed to the index.
    pub fn indexed(&self) -> usize { self.fetched - self.failed }
}

/// Fetched pages waiting to have their links followed, plus every URL ever tried.
#[derive(Default)]
struct Frontier {
    pending: VecDeque<Vec<Url>>,
    seen: HashSet<String>,
}

impl Frontier {
    /// False if `url` was already tried.
    fn mark(&mut self, url: &Url) -> bool { self.seen.insert(norm(url)) }
}

pub struct WebCrawler<F> {
    fetcher: F,
    index: Arc<ConcurrentIndex>,
    queue: WorkQueue,
    limit: usize,
}

impl<F: Fetcher> WebCrawler<F> {
    pub fn new(fetcher: F, index: Arc<ConcurrentIndex>, config: &CrawlConfig) -> io::Result<Self> {
        let queue = WorkQueue::new(config.threads)?;
        Ok(Self { fetcher, index, queue, limit: config.limit })
    }

    /// Crawl from `seed` until the budget is spent or no links remain.
    ///
    /// Returns once every fetched page is in the index and the worker pool has exited.
    pub fn crawl(self, seed: &Url) -> CrawlReport {
        let mut frontier = Frontier::default();
        let mut report = CrawlReport::default();

        self.visit(seed, &mut frontier, &mut report);
        while report.fetched < self.limit {
            let Some(links) = frontier.pending.pop_front() else { break };
            for link in links {
                if report.fetched >= self.limit {
                    break;
                }
                self.visit(&link, &mut frontier, &mut report);
            }
        }

        self.queue.finish();
        tracing::info!(
            seed = %seed,
            fetched = report.fetched,
            failed = report.failed,
            frontier = frontier.pending.len(),
            num_terms = self.index.word_count(),
            "crawl complete"
        );
        self.queue.join();
        report
    }

    fn visit(&self, url: &Url, frontier: &mut Frontier, report: &mut CrawlReport) {
        if self.limit == 0 || !frontier.mark(url) {
            return;
        }
        report.fetched += 1;
        match self.fetcher.fetch(url) {
            Ok(page) => {
                frontier.pending.push_back(extract_links(&page.final_url, &page.html));
                let index = Arc::clone(&self.index);
                let location = norm(url);
                tracing::debug!(url = %location, status = page.status, "fetched page");
                self.queue.execute(move || {
                    index_page(&index, &location, &page.html);
                    Ok(())
                });
            }
            Err(err) => {
                report.failed += 1;
                tracing::warn!(url = %url, "dropping page: {err}");
            }
        }
    }
}

/// Strip, stem and publish one page under `location`, positions starting at 1.
///
/// The page is built privately first, so its positions are numbered without
/// interference from other pages being indexed at the same time.
pub fn index_page(index: &ConcurrentIndex, location: &str, html: &str) -> usize {
    let mut local = InvertedIndex::new();
    local.add_all(&stems(&strip_markup(html)), location, 1);
    index.merge(local)
}

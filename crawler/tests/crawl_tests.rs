use parking_lot::Mutex;
use sift_core::tokenizer::query_terms;
use sift_core::ConcurrentIndex;
use sift_crawler::{CrawlConfig, CrawlReport, FetchError, Fetcher, Page, WebCrawler};
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// Pages keyed by URL; anything else answers 404. Records every fetch.
#[derive(Default)]
struct FakeWeb {
    pages: HashMap<String, String>,
    log: Mutex<Vec<String>>,
}

impl FakeWeb {
    fn page(mut self, url: &str, body: &str, links: &[&str]) -> Self {
        let anchors: String = links.iter().map(|l| format!("<a href=\"{l}\">link</a>")).collect();
        let html = format!("<html><head><title>t</title></head><body><p>{body}</p>{anchors}</body></html>");
        self.pages.insert(url.to_string(), html);
        self
    }

    fn fetches(&self) -> Vec<String> {
        self.log.lock().clone()
    }
}

impl Fetcher for FakeWeb {
    fn fetch(&self, url: &Url) -> Result<Page, FetchError> {
        self.log.lock().push(url.to_string());
        match self.pages.get(url.as_str()) {
            Some(html) => Ok(Page { final_url: url.clone(), status: 200, html: html.clone() }),
            None => Err(FetchError::Status { url: url.to_string(), status: 404 }),
        }
    }
}

fn run(web: &FakeWeb, seed: &str, limit: usize) -> (Arc<ConcurrentIndex>, CrawlReport) {
    let index = Arc::new(ConcurrentIndex::new());
    let config = CrawlConfig { limit, threads: 3, ..CrawlConfig::default() };
    let crawler = WebCrawler::new(web, Arc::clone(&index), &config).unwrap();
    let report = crawler.crawl(&Url::parse(seed).unwrap());
    (index, report)
}

fn site() -> FakeWeb {
    FakeWeb::default()
        .page("http://site.test/", "home page about computers", &["/a", "/b", "/a#again", "/"])
        .page("http://site.test/a", "alpha computing science", &["/c", "/b"])
        .page("http://site.test/b", "beta science", &["/c", "/missing"])
        .page("http://site.test/c", "gamma", &["/d"])
        .page("http://site.test/d", "delta", &[])
}

#[test]
fn crawls_every_reachable_page_once() {
    let web = site();
    let (index, report) = run(&web, "http://site.test/", 50);

    assert_eq!(
        web.fetches(),
        vec![
            "http://site.test/",
            "http://site.test/a",
            "http://site.test/b",
            "http://site.test/c",
            "http://site.test/missing",
            "http://site.test/d",
        ]
    );
    assert_eq!(report, CrawlReport { fetched: 6, failed: 1 });
    assert_eq!(report.indexed(), 5);

    assert_eq!(index.location_count("scienc"), 2);
    assert!(index.contains_position("home", "http://site.test/", 1));
    assert!(index.contains_position("delta", "http://site.test/d", 1));
    assert_eq!(index.location_count("link"), 4);
    assert!(!index.contains_word("t"));
    assert_eq!(index.location_word_counts().len(), 5);
}

#[test]
fn never_exceeds_the_budget() {
    let web = site();
    let (index, report) = run(&web, "http://site.test/", 3);

    assert_eq!(report.fetched, 3);
    assert_eq!(web.fetches().len(), 3);
    assert_eq!(index.location_word_counts().len(), 3);
    assert!(index.contains_location("beta", "http://site.test/b"));
    assert!(!index.contains_word("gamma"));
}

#[test]
fn shared_links_are_fetched_once() {
    let web = site();
    run(&web, "http://site.test/", 50);
    let fetches = web.fetches();
    let c = fetches.iter().filter(|u| u.as_str() == "http://site.test/c").count();
    assert_eq!(c, 1);
    assert_eq!(fetches.iter().filter(|u| u.as_str() == "http://site.test/").count(), 1);
}

#[test]
fn a_dead_seed_indexes_nothing() {
    let web = site();
    let (index, report) = run(&web, "http://site.test/nowhere", 10);
    assert_eq!(report, CrawlReport { fetched: 1, failed: 1 });
    assert!(index.is_empty());
}

#[test]
fn crawled_pages_are_searchable() {
    let web = site();
    let (index, _) = run(&web, "http://site.test/", 50);
    // "link" anchor text counts toward each page's length: a has 5 words, b has 4.
    let results = index.exact_search(&query_terms("science"));
    let locations: Vec<&str> = results.iter().map(|r| r.location()).collect();
    assert_eq!(locations, vec!["http://site.test/b", "http://site.test/a"]);
}

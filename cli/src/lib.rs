use anyhow::Result;
use clap::Parser;
use sift_core::persist::{save_counts, save_index};
use sift_core::{ConcurrentIndex, InvertedIndex, QueryEngine, SearchMode, WorkQueue, DEFAULT_THREADS};
use sift_crawler::CrawlConfig;
use sift_indexer::{build_index, build_index_concurrent};
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

#[derive(Parser, Debug, Clone)]
#[command(name = "sift")]
#[command(about = "Index text files or a crawled site in memory and answer queries", long_about = None)]
pub struct Args {
    /// Text file or directory to index
    #[arg(long)]
    pub path: Option<PathBuf>,
    /// Seed URL to crawl (implies multithreading)
    #[arg(long)]
    pub url: Option<String>,
    /// Maximum number of pages to fetch while crawling
    #[arg(long, default_value_t = 50)]
    pub limit: usize,
    /// Redirects followed per fetch
    #[arg(long, default_value_t = 3)]
    pub redirects: usize,
    /// Worker threads; giving the flag enables multithreading
    #[arg(long, num_args = 0..=1, default_missing_value = "5")]
    pub threads: Option<usize>,
    /// Query file, one query per line
    #[arg(long = "search", visible_alias = "query")]
    pub query: Option<PathBuf>,
    /// Match query terms exactly instead of as prefixes
    #[arg(long, default_value_t = false)]
    pub exact: bool,
    /// Write the inverted index as JSON
    #[arg(long, num_args = 0..=1, default_missing_value = "index.json")]
    pub index: Option<PathBuf>,
    /// Write the word count of every location as JSON
    #[arg(long = "locations", visible_alias = "counts", num_args = 0..=1, default_missing_value = "locations.json")]
    pub counts: Option<PathBuf>,
    /// Write the search results as JSON
    #[arg(long, num_args = 0..=1, default_missing_value = "results.json")]
    pub results: Option<PathBuf>,
}

impl Args {
    /// Worker count when the multithreaded pipeline is selected.
    pub fn workers(&self) -> Option<usize> {
        match self.threads {
            Some(n) if n >= 1 => Some(n),
            Some(_) => Some(DEFAULT_THREADS),
            None if self.url.is_some() => Some(DEFAULT_THREADS),
            None => None,
        }
    }
}

/// Run every requested stage in order. A failing stage is logged and the rest still run.
pub fn run(args: &Args) -> Result<()> {
    let mode = SearchMode::from_exact(args.exact);
    match args.workers() {
        Some(threads) => run_concurrent(args, threads, mode),
        None => run_serial(args, mode),
    }
}

fn run_serial(args: &Args, mode: SearchMode) -> Result<()> {
    let mut index = InvertedIndex::new();
    if let Some(path) = &args.path {
        report("index files", build_index(path, &mut index).map(drop));
    }
    if let Some(out) = &args.index {
        report("write index", save_index(out, &index));
    }
    if let Some(out) = &args.counts {
        report("write counts", save_counts(out, &index.location_word_counts()));
    }

    let engine = QueryEngine::new(Arc::new(index), mode);
    if let Some(query) = &args.query {
        report("answer queries", engine.search_file(query));
    }
    if let Some(out) = &args.results {
        report("write results", engine.save(out));
    }
    Ok(())
}

fn run_concurrent(args: &Args, threads: usize, mode: SearchMode) -> Result<()> {
    let index = Arc::new(ConcurrentIndex::new());
    if let Some(seed) = &args.url {
        match Url::parse(seed) {
            Ok(seed) => {
                let config = CrawlConfig {
                    limit: args.limit,
                    max_redirects: args.redirects,
                    threads,
                    ..CrawlConfig::default()
                };
                report("crawl", sift_crawler::crawl(&seed, &index, &config).map(drop));
            }
            Err(err) => tracing::error!(url = %seed, "invalid seed url: {err}"),
        }
    }

    let queue = WorkQueue::new(threads)?;
    if let Some(path) = &args.path {
        report("index files", build_index_concurrent(path, &index, &queue).map(drop));
    }
    if let Some(out) = &args.index {
        report("write index", save_index(out, &index.snapshot()));
    }
    if let Some(out) = &args.counts {
        report("write counts", save_counts(out, &index.location_word_counts()));
    }

    let engine = Arc::new(QueryEngine::new(index, mode));
    if let Some(query) = &args.query {
        report("answer queries", engine.search_file_with(query, &queue));
    }
    if let Some(out) = &args.results {
        report("write results", engine.save(out));
    }
    queue.join();
    Ok(())
}

fn report(stage: &str, result: Result<()>) {
    if let Err(err) = result {
        tracing::warn!(stage, "{err:#}");
    }
}

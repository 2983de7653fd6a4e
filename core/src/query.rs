//! Answers query files against an index.
//!
//! Each line is one query, identified by its sorted set of distinct stems joined
//! with single spaces. A key is answered once per engine; repeated lines reuse it.
//! Location word counts are read from the index for every line or query file, so
//! locations added between queries are scored against their current size.

use crate::persist::{self, QueryResults};
use crate::search::{SearchMode, SearchResult, Searchable, WordCounts};
use crate::tokenizer::query_terms;
use crate::WorkQueue;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

pub struct QueryEngine<I> {
    index: Arc<I>,
    mode: SearchMode,
    results: Mutex<QueryResults>,
}

impl<I: Searchable> QueryEngine<I> {
    pub fn new(index: Arc<I>, mode: SearchMode) -> Self {
        Self { index, mode, results: Mutex::new(QueryResults::new()) }
    }

    pub fn mode(&self) -> SearchMode { self.mode }

    /// Answer one query line. Returns its key, or `None` for a line with no terms.
    pub fn search_line(&self, line: &str) -> Option<String> {
        let (key, terms) = canonical(line)?;
        if !self.answered(&key) {
            self.commit(&key, &terms, &self.index.location_word_counts());
        }
        Some(key)
    }

    /// Like [`search_line`](Self::search_line) with a word-count table shared by a batch.
    fn search_line_with(&self, line: &str, counts: &WordCounts) -> Option<String> {
        let (key, terms) = canonical(line)?;
        if !self.answered(&key) {
            self.commit(&key, &terms, counts);
        }
        Some(key)
    }

    fn answered(&self, key: &str) -> bool {
        self.results.lock().contains_key(key)
    }

    // Computed outside the lock; two threads racing on a key produce the same list.
    fn commit(&self, key: &str, terms: &BTreeSet<String>, counts: &WordCounts) {
        let ranked = self.index.search_with(terms, self.mode, counts);
        tracing::debug!(query = %key, hits = ranked.len(), "answered query");
        self.results.lock().entry(key.to_string()).or_insert(ranked);
    }

    /// Answer every line of a query file on the calling thread.
    pub fn search_file(&self, path: &Path) -> Result<()> {
        let counts = self.index.location_word_counts();
        for line in read_lines(path)? {
            self.search_line_with(&line?, &counts);
        }
        tracing::info!(path = %path.display(), queries = self.len(), "answered query file");
        Ok(())
    }

    /// Ranked results for a query key; empty when it was never answered.
    pub fn get(&self, key: &str) -> Vec<SearchResult> {
        self.results.lock().get(key).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize { self.results.lock().len() }

    pub fn is_empty(&self) -> bool { self.results.lock().is_empty() }

    /// Copy of every answered query.
    pub fn results(&self) -> QueryResults {
        self.results.lock().clone()
    }

    pub fn into_results(self) -> QueryResults {
        self.results.into_inner()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        persist::save_results(path, &self.results.lock())
    }
}

impl<I: Searchable + Send + Sync + 'static> QueryEngine<I> {
    /// Answer every line of a query file, one task per line, then wait for the pool to drain.
    pub fn search_file_with(self: &Arc<Self>, path: &Path, queue: &WorkQueue) -> Result<()> {
        let counts = Arc::new(self.index.location_word_counts());
        for line in read_lines(path)? {
            let line = line?;
            let engine = Arc::clone(self);
            let counts = Arc::clone(&counts);
            queue.execute(move || {
                engine.search_line_with(&line, &counts);
                Ok(())
            });
        }
        queue.finish();
        tracing::info!(path = %path.display(), queries = self.len(), "answered query file");
        Ok(())
    }
}

/// The query key and its terms, or `None` when the line has no terms.
fn canonical(line: &str) -> Option<(String, BTreeSet<String>)> {
    let terms = query_terms(line);
    if terms.is_empty() {
        return None;
    }
    let key = terms.iter().map(String::as_str).collect::<Vec<_>>().join(" ");
    Some((key, terms))
}

fn read_lines(path: &Path) -> Result<std::io::Lines<BufReader<File>>> {
    let f = File::open(path).with_context(|| format!("opening query file {}", path.display()))?;
    Ok(BufReader::new(f).lines())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConcurrentIndex, InvertedIndex};

    fn sample() -> InvertedIndex {
        let mut index = InvertedIndex::new();
        index.add_all(&["comput", "comput", "scienc"], "a.txt", 1);
        index.add_all(&["comput", "data", "data", "data"], "b.txt", 1);
        index
    }

    #[test]
    fn duplicate_lines_share_a_key() {
        let engine = QueryEngine::new(Arc::new(sample()), SearchMode::Exact);
        assert_eq!(engine.search_line("Science computers"), Some("comput scienc".to_string()));
        assert_eq!(engine.search_line("computer science SCIENCE"), Some("comput scienc".to_string()));
        assert_eq!(engine.search_line("  42 !! "), None);
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn exact_results_are_ranked() {
        let engine = QueryEngine::new(Arc::new(sample()), SearchMode::Exact);
        let key = engine.search_line("computing").unwrap();
        let results = engine.get(&key);

        let summary: Vec<_> = results.iter().map(|r| (r.location(), r.matches(), r.words())).collect();
        assert_eq!(summary, vec![("a.txt", 2, 3), ("b.txt", 1, 4)]);
        assert_eq!(results[0].display_score(), "0.666667");
        assert!(engine.get("never asked").is_empty());
    }

    #[test]
    fn partial_mode_matches_prefixes() {
        let engine = QueryEngine::new(Arc::new(sample()), SearchMode::Partial);
        let key = engine.search_line("dat").unwrap();
        let results = engine.get(&key);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].location(), "b.txt");
        assert_eq!(results[0].matches(), 3);
    }

    #[test]
    fn pooled_answers_match_serial_answers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queries.txt");
        std::fs::write(&path, "computer\nscience data\n\ncomputer\ndata science\nco\n").unwrap();

        let serial = QueryEngine::new(Arc::new(sample()), SearchMode::Partial);
        serial.search_file(&path).unwrap();

        let concurrent = ConcurrentIndex::new();
        concurrent.merge(sample());
        let pooled = Arc::new(QueryEngine::new(Arc::new(concurrent), SearchMode::Partial));
        let queue = WorkQueue::new(3).unwrap();
        pooled.search_file_with(&path, &queue).unwrap();

        assert_eq!(serial.results(), pooled.results());
        assert_eq!(serial.len(), 3);
    }

    #[test]
    fn locations_added_between_queries_are_scored_by_their_size() {
        let index = Arc::new(ConcurrentIndex::new());
        index.add_all(&["comput", "scienc"], "a.txt", 1);
        let engine = QueryEngine::new(Arc::clone(&index), SearchMode::Exact);
        engine.search_line("science");

        index.add_all(&["data", "data", "scienc"], "b.txt", 1);
        let key = engine.search_line("data").unwrap();
        let results = engine.get(&key);

        let summary: Vec<_> = results.iter().map(|r| (r.location(), r.matches(), r.words())).collect();
        assert_eq!(summary, vec![("b.txt", 2, 3)]);
        assert_eq!(results[0].display_score(), "0.666667");
    }

    #[test]
    fn missing_query_file_is_an_error() {
        let engine = QueryEngine::new(Arc::new(sample()), SearchMode::Exact);
        assert!(engine.search_file(Path::new("/definitely/not/here.txt")).is_err());
    }
}

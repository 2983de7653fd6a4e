//! Thread-safe inverted index.
//!
//! The word map sits behind one `RwLock` that is taken for writing only when a
//! word is seen for the first time. Each word owns its own `RwLock`ed bucket, so
//! writers touching different words proceed in parallel. Locks are always taken
//! word map first, bucket second.

use crate::index::{self, InvertedIndex, Locations};
use crate::search::{ResultSet, SearchMode, SearchResult, Searchable, WordCounts};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

type Bucket = Arc<RwLock<Locations>>;

#[derive(Debug, Default)]
pub struct ConcurrentIndex {
    words: RwLock<BTreeMap<String, Bucket>>,
}

impl ConcurrentIndex {
    pub fn new() -> Self { Self::default() }

    fn bucket(&self, word: &str) -> Option<Bucket> {
        self.words.read().get(word).cloned()
    }

    /// Record `word` at `position` in `location`. Returns false if it was already there.
    pub fn add(&self, word: &str, location: &str, position: usize) -> bool {
        let bucket = match self.bucket(word) {
            Some(bucket) => bucket,
            None => {
                let mut words = self.words.write();
                match words.get(word) {
                    Some(bucket) => Arc::clone(bucket),
                    None => {
                        // Published with its first location so no reader sees an empty word.
                        let mut locations = Locations::new();
                        locations.entry(location.to_string()).or_default().insert(position);
                        words.insert(word.to_string(), Arc::new(RwLock::new(locations)));
                        return true;
                    }
                }
            }
        };
        let mut locations = bucket.write();
        locations.entry(location.to_string()).or_default().insert(position)
    }

    /// Add `words` at consecutive positions starting at `start`; returns how many were new.
    pub fn add_all<S: AsRef<str>>(&self, words: &[S], location: &str, start: usize) -> usize {
        let mut local = InvertedIndex::new();
        local.add_all(words, location, start);
        self.merge(local)
    }

    /// Publish a privately built index, one word bucket at a time.
    ///
    /// Returns the number of positions that were not already present.
    pub fn merge(&self, other: InvertedIndex) -> usize {
        let mut added = 0;
        for (word, locations) in other.into_words() {
            let bucket = match self.bucket(&word) {
                Some(bucket) => bucket,
                None => {
                    let mut words = self.words.write();
                    match words.get(&word) {
                        Some(bucket) => Arc::clone(bucket),
                        None => {
                            added += locations.values().map(|p| p.len()).sum::<usize>();
                            words.insert(word, Arc::new(RwLock::new(locations)));
                            continue;
                        }
                    }
                }
            };
            let mut mine = bucket.write();
            for (location, positions) in locations {
                let target = mine.entry(location).or_default();
                for position in positions {
                    if target.insert(position) {
                        added += 1;
                    }
                }
            }
        }
        added
    }

    pub fn word_count(&self) -> usize { self.words.read().len() }

    pub fn location_count(&self, word: &str) -> usize {
        self.bucket(word).map_or(0, |bucket| bucket.read().len())
    }

    pub fn position_count(&self, word: &str, location: &str) -> usize {
        self.bucket(word)
            .map_or(0, |bucket| bucket.read().get(location).map_or(0, |p| p.len()))
    }

    pub fn contains_word(&self, word: &str) -> bool { self.words.read().contains_key(word) }

    pub fn contains_location(&self, word: &str, location: &str) -> bool {
        self.bucket(word).is_some_and(|bucket| bucket.read().contains_key(location))
    }

    pub fn contains_position(&self, word: &str, location: &str, position: usize) -> bool {
        self.bucket(word)
            .is_some_and(|bucket| bucket.read().get(location).is_some_and(|p| p.contains(&position)))
    }

    /// Copy of the locations of `word`; empty when the word was never added.
    pub fn get(&self, word: &str) -> Locations {
        self.bucket(word).map(|bucket| bucket.read().clone()).unwrap_or_default()
    }

    /// Copy of the positions of `word` in `location`; empty when either is unknown.
    pub fn positions(&self, word: &str, location: &str) -> index::Positions {
        self.bucket(word)
            .and_then(|bucket| bucket.read().get(location).cloned())
            .unwrap_or_default()
    }

    pub fn words(&self) -> Vec<String> {
        self.words.read().keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool { self.words.read().is_empty() }

    /// An owned copy of everything committed so far.
    pub fn snapshot(&self) -> InvertedIndex {
        let words = self.words.read();
        InvertedIndex::from_words(
            words.iter().map(|(word, bucket)| (word.clone(), bucket.read().clone())).collect(),
        )
    }

    pub fn location_word_counts(&self) -> WordCounts {
        let words = self.words.read();
        let mut counts = WordCounts::new();
        for bucket in words.values() {
            index::tally(&mut counts, &bucket.read());
        }
        counts
    }

    pub fn exact_search(&self, terms: &BTreeSet<String>) -> Vec<SearchResult> {
        self.search(terms, SearchMode::Exact)
    }

    pub fn partial_search(&self, terms: &BTreeSet<String>) -> Vec<SearchResult> {
        self.search(terms, SearchMode::Partial)
    }
}

impl Searchable for ConcurrentIndex {
    fn location_word_counts(&self) -> WordCounts {
        ConcurrentIndex::location_word_counts(self)
    }

    fn search_with(&self, terms: &BTreeSet<String>, mode: SearchMode, counts: &WordCounts) -> Vec<SearchResult> {
        let words = self.words.read();
        let mut results = ResultSet::new(counts);
        match mode {
            SearchMode::Exact => {
                for term in terms {
                    if let Some(bucket) = words.get(term) {
                        results.add_locations(&bucket.read());
                    }
                }
            }
            SearchMode::Partial => {
                let mut matched = BTreeSet::new();
                for term in terms {
                    for (word, bucket) in index::prefixed(&*words, term) {
                        if matched.insert(word.as_str()) {
                            results.add_locations(&bucket.read());
                        }
                    }
                }
            }
        }
        results.into_ranked()
    }
}

use crate::search::{ResultSet, SearchMode, SearchResult, Searchable, WordCounts};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

/// Sorted, unique 1-based positions of a word within one location.
pub type Positions = BTreeSet<usize>;

/// Location (file path or URL) to the positions of a word in it.
pub type Locations = BTreeMap<String, Positions>;

static NO_LOCATIONS: Locations = BTreeMap::new();
static NO_POSITIONS: Positions = BTreeSet::new();

/// Word -> location -> positions.
///
/// Every word present has at least one location and every location at least one
/// position; nothing is ever removed. Iteration is lexicographic at both levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvertedIndex {
    words: BTreeMap<String, Locations>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub(crate) fn from_words(words: BTreeMap<String, Locations>) -> Self {
        Self { words }
    }

    pub(crate) fn into_words(self) -> BTreeMap<String, Locations> {
        self.words
    }

    /// Record `word` at `position` in `location`. Returns false if it was already there.
    pub fn add(&mut self, word: &str, location: &str, position: usize) -> bool {
        self.words
            .entry(word.to_string())
            .or_default()
            .entry(location.to_string())
            .or_default()
            .insert(position)
    }

    /// Add `words` at consecutive positions starting at `start`; returns how many were new.
    pub fn add_all<S: AsRef<str>>(&mut self, words: &[S], location: &str, start: usize) -> usize {
        let mut added = 0;
        for (word, position) in words.iter().zip(start..) {
            if self.add(word.as_ref(), location, position) {
                added += 1;
            }
        }
        added
    }

    /// Fold every entry of `other` into this index.
    pub fn merge(&mut self, other: InvertedIndex) {
        for (word, locations) in other.words {
            let mine = self.words.entry(word).or_default();
            for (location, positions) in locations {
                mine.entry(location).or_default().extend(positions);
            }
        }
    }

    pub fn word_count(&self) -> usize { self.words.len() }

    pub fn location_count(&self, word: &str) -> usize {
        self.get(word).len()
    }

    pub fn position_count(&self, word: &str, location: &str) -> usize {
        self.positions(word, location).len()
    }

    pub fn contains_word(&self, word: &str) -> bool { self.words.contains_key(word) }

    pub fn contains_location(&self, word: &str, location: &str) -> bool {
        self.get(word).contains_key(location)
    }

    pub fn contains_position(&self, word: &str, location: &str, position: usize) -> bool {
        self.positions(word, location).contains(&position)
    }

    /// Locations of `word`; empty when the word was never added.
    pub fn get(&self, word: &str) -> &Locations {
        self.words.get(word).unwrap_or(&NO_LOCATIONS)
    }

    /// Positions of `word` in `location`; empty when either is unknown.
    pub fn positions(&self, word: &str, location: &str) -> &Positions {
        self.get(word).get(location).unwrap_or(&NO_POSITIONS)
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool { self.words.is_empty() }

    /// Total indexed positions per location, summed over all words.
    pub fn location_word_counts(&self) -> WordCounts {
        let mut counts = WordCounts::new();
        for locations in self.words.values() {
            tally(&mut counts, locations);
        }
        counts
    }

    pub fn exact_search(&self, terms: &BTreeSet<String>) -> Vec<SearchResult> {
        self.search(terms, SearchMode::Exact)
    }

    pub fn partial_search(&self, terms: &BTreeSet<String>) -> Vec<SearchResult> {
        self.search(terms, SearchMode::Partial)
    }

    /// Index words starting with `prefix`, in order.
    pub(crate) fn prefixed<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a String, &'a Locations)> + 'a {
        prefixed(&self.words, prefix)
    }
}

impl Searchable for InvertedIndex {
    fn location_word_counts(&self) -> WordCounts {
        InvertedIndex::location_word_counts(self)
    }

    fn search_with(&self, terms: &BTreeSet<String>, mode: SearchMode, counts: &WordCounts) -> Vec<SearchResult> {
        let mut results = ResultSet::new(counts);
        match mode {
            SearchMode::Exact => {
                for term in terms {
                    if let Some(locations) = self.words.get(term) {
                        results.add_locations(locations);
                    }
                }
            }
            SearchMode::Partial => {
                let mut matched = BTreeSet::new();
                for term in terms {
                    for (word, locations) in self.prefixed(term) {
                        if matched.insert(word.as_str()) {
                            results.add_locations(locations);
                        }
                    }
                }
            }
        }
        results.into_ranked()
    }
}

/// Entries of a word-keyed map whose key starts with `prefix`.
pub(crate) fn prefixed<'a, V>(map: &'a BTreeMap<String, V>, prefix: &'a str) -> impl Iterator<Item = (&'a String, &'a V)> + 'a {
    map.range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
        .take_while(move |(word, _)| word.starts_with(prefix))
}

pub(crate) fn tally(counts: &mut WordCounts, locations: &Locations) {
    for (location, positions) in locations {
        *counts.entry(location.clone()).or_insert(0) += positions.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InvertedIndex {
        let mut index = InvertedIndex::new();
        index.add_all(&["comput", "comput", "scienc"], "a.txt", 1);
        index
    }

    #[test]
    fn counts_follow_distinct_inserts() {
        let mut index = sample();
        assert_eq!(index.word_count(), 2);
        assert_eq!(index.location_count("comput"), 1);
        assert_eq!(index.position_count("comput", "a.txt"), 2);

        assert!(!index.add("comput", "a.txt", 2));
        assert_eq!(index.position_count("comput", "a.txt"), 2);
    }

    #[test]
    fn unknown_keys_are_empty() {
        let index = sample();
        assert_eq!(index.location_count("missing"), 0);
        assert_eq!(index.position_count("comput", "b.txt"), 0);
        assert_eq!(index.position_count("missing", "a.txt"), 0);
        assert!(index.get("missing").is_empty());
        assert!(index.positions("comput", "nowhere").is_empty());
        assert!(!index.contains_location("missing", "a.txt"));
    }

    #[test]
    fn merge_unions_positions() {
        let mut left = sample();
        let mut right = InvertedIndex::new();
        right.add("comput", "a.txt", 7);
        right.add("data", "b.txt", 1);
        left.merge(right);

        assert_eq!(left.word_count(), 3);
        let positions: Vec<_> = left.positions("comput", "a.txt").iter().copied().collect();
        assert_eq!(positions, vec![1, 2, 7]);
    }

    #[test]
    fn location_word_counts_sum_positions() {
        let mut index = sample();
        index.add("scienc", "b.txt", 1);
        let counts = index.location_word_counts();
        assert_eq!(counts.get("a.txt"), Some(&3));
        assert_eq!(counts.get("b.txt"), Some(&1));
    }

    #[test]
    fn prefix_scan_stops_at_first_non_match() {
        let mut index = InvertedIndex::new();
        for word in ["apple", "appli", "apt", "banana", "ap"] {
            index.add(word, "x", 1);
        }
        let words: Vec<_> = index.prefixed("app").map(|(w, _)| w.as_str()).collect();
        assert_eq!(words, vec!["apple", "appli"]);
    }
}

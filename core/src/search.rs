use crate::index::Locations;
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Total indexed words per location.
pub type WordCounts = BTreeMap<String, usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Query terms match index words literally.
    Exact,
    /// Query terms match every index word they are a prefix of.
    Partial,
}

impl SearchMode {
    pub fn from_exact(exact: bool) -> Self {
        if exact { SearchMode::Exact } else { SearchMode::Partial }
    }
}

/// One location matching a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    #[serde(rename = "where")]
    location: String,
    #[serde(rename = "count")]
    matches: usize,
    #[serde(skip)]
    words: usize,
    #[serde(rename = "score", serialize_with = "six_decimals")]
    score: f64,
}

impl SearchResult {
    pub fn new(location: impl Into<String>, words: usize) -> Self {
        Self { location: location.into(), matches: 0, words, score: 0.0 }
    }

    /// Fold in more occurrences and recompute the score.
    pub fn add_matches(&mut self, matches: usize) {
        self.matches += matches;
        debug_assert!(self.matches <= self.words, "{} has more matches than words", self.location);
        self.score = self.matches as f64 / self.words as f64;
    }

    pub fn location(&self) -> &str { &self.location }
    pub fn matches(&self) -> usize { self.matches }
    pub fn words(&self) -> usize { self.words }
    pub fn score(&self) -> f64 { self.score }

    /// Score rounded half-up to six decimals, e.g. `0.666667`.
    pub fn display_score(&self) -> String {
        six_places(self.score)
    }

    /// Higher score first, then more words, then location ignoring case.
    pub fn rank(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.words.cmp(&self.words))
            .then_with(|| self.location.to_lowercase().cmp(&other.location.to_lowercase()))
            .then_with(|| self.location.cmp(&other.location))
    }
}

fn six_places(score: f64) -> String {
    format!("{:.6}", (score * 1e6).round() / 1e6)
}

// Written as a bare JSON number with exactly six decimals.
fn six_decimals<S: Serializer>(score: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    RawValue::from_string(six_places(*score)).map_err(S::Error::custom)?.serialize(serializer)
}

/// Anything that can answer a set of stemmed query terms.
pub trait Searchable {
    fn location_word_counts(&self) -> WordCounts;

    /// Search using a precomputed word-count table.
    fn search_with(&self, terms: &BTreeSet<String>, mode: SearchMode, counts: &WordCounts) -> Vec<SearchResult>;

    fn search(&self, terms: &BTreeSet<String>, mode: SearchMode) -> Vec<SearchResult> {
        self.search_with(terms, mode, &self.location_word_counts())
    }
}

/// Per-location accumulator for a single query.
pub(crate) struct ResultSet<'a> {
    counts: &'a WordCounts,
    hits: HashMap<String, SearchResult>,
}

impl<'a> ResultSet<'a> {
    pub(crate) fn new(counts: &'a WordCounts) -> Self {
        Self { counts, hits: HashMap::new() }
    }

    /// Count every occurrence of one matched word.
    pub(crate) fn add_locations(&mut self, locations: &Locations) {
        for (location, positions) in locations {
            let counts = self.counts;
            self.hits
                .entry(location.clone())
                .or_insert_with(|| SearchResult::new(location.clone(), counts.get(location).copied().unwrap_or(0)))
                .add_matches(positions.len());
        }
    }

    pub(crate) fn into_ranked(self) -> Vec<SearchResult> {
        let mut ranked: Vec<SearchResult> = self.hits.into_values().collect();
        ranked.sort_by(SearchResult::rank);
        ranked
    }
}

use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;
use std::collections::BTreeSet;

lazy_static! {
    static ref CLEAN: Regex = Regex::new(r"(?u)[^\p{Alphabetic}\p{White_Space}]+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Decompose (NFD), drop everything that is neither a letter nor whitespace, lowercase.
///
/// Combining marks are removed along with punctuation and digits, so `café` becomes `cafe`.
pub fn clean(text: &str) -> String {
    let decomposed = text.nfd().collect::<String>();
    CLEAN.replace_all(&decomposed, "").to_lowercase()
}

/// Cleaned words of `text`, split on whitespace runs.
pub fn parse(text: &str) -> Vec<String> {
    clean(text).split_whitespace().map(str::to_string).collect()
}

/// Snowball (English) stems of every word in `text`, in reading order.
pub fn stems(text: &str) -> Vec<String> {
    parse(text)
        .iter()
        .map(|word| STEMMER.stem(word).into_owned())
        .filter(|stem| !stem.is_empty())
        .collect()
}

/// Tokenize text into (stem, position) with positions counted from 1.
pub fn tokenize(text: &str) -> Vec<(String, usize)> {
    stems(text).into_iter().zip(1..).collect()
}

/// The distinct stems of a query line in lexicographic order.
pub fn query_terms(line: &str) -> BTreeSet<String> {
    stems(line).into_iter().collect()
}

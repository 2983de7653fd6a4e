use sift_core::tokenizer::{query_terms, stems, tokenize};

#[test]
fn accents_and_punctuation_vanish_before_stemming() {
    let toks = tokenize("Running Runners RUN! The café's menu.");
    let expected: Vec<(String, usize)> = ["run", "runner", "run", "the", "cafe", "menu"]
        .iter()
        .zip(1..)
        .map(|(w, p)| (w.to_string(), p))
        .collect();
    assert_eq!(toks, expected);
}

#[test]
fn it_keeps_every_word_in_order() {
    let toks = tokenize("The quick brown fox and the lazy dog");
    let positions: Vec<usize> = toks.iter().map(|(_, p)| *p).collect();
    assert_eq!(positions, (1..=8).collect::<Vec<_>>());
    assert_eq!(toks[0].0, "the");
    assert_eq!(toks[4].0, "and");
}

#[test]
fn it_stems_to_shared_roots() {
    assert_eq!(stems("computer computing science"), vec!["comput", "comput", "scienc"]);
}

#[test]
fn query_terms_are_a_sorted_set() {
    let terms: Vec<String> = query_terms("science Computer computers science").into_iter().collect();
    assert_eq!(terms, vec!["comput", "scienc"]);
    assert!(query_terms("1234 ... ").is_empty());
}

use criterion::{criterion_group, criterion_main, Criterion};
use sift_core::tokenizer::{query_terms, tokenize};
use sift_core::{InvertedIndex, SearchMode, Searchable};

const TEXT: &str = "The inverted index maps every stemmed word to the locations it appears in, \
    and every location to the positions of that word. Computers compute; computation is computed. \
    Searching for a computer scientist returns documents about computing science, ranked by how \
    often the words occur relative to the length of each document.";

fn bench_tokenize(c: &mut Criterion) {
    c.bench_function("tokenize_paragraph", |b| b.iter(|| tokenize(TEXT)));
}

fn bench_search(c: &mut Criterion) {
    let mut index = InvertedIndex::new();
    for doc in 0..200 {
        let words: Vec<String> = tokenize(TEXT).into_iter().map(|(w, _)| w).collect();
        index.add_all(&words, &format!("doc{doc}.txt"), 1);
    }
    let counts = index.location_word_counts();
    let terms = query_terms("computer science");
    c.bench_function("exact_search", |b| b.iter(|| index.search_with(&terms, SearchMode::Exact, &counts)));
    c.bench_function("partial_search", |b| b.iter(|| index.search_with(&terms, SearchMode::Partial, &counts)));
}

criterion_group!(benches, bench_tokenize, bench_search);
criterion_main!(benches);

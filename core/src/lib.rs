//! In-memory inverted index with exact and prefix search.

pub mod concurrent;
pub mod index;
pub mod persist;
pub mod query;
pub mod search;
pub mod tokenizer;
pub mod work_queue;

pub use concurrent::ConcurrentIndex;
pub use index::{InvertedIndex, Locations, Positions};
pub use query::QueryEngine;
pub use search::{SearchMode, SearchResult, Searchable, WordCounts};
pub use work_queue::{WorkQueue, DEFAULT_THREADS};

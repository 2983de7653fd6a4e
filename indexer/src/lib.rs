use anyhow::{bail, Context, Result};
use sift_core::tokenizer::stems;
use sift_core::{ConcurrentIndex, InvertedIndex, WorkQueue};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Files with a `txt` or `text` extension, in any case.
pub fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt") || ext.eq_ignore_ascii_case("text"))
}

/// Text files under `root` in file-name order. A root that is itself a file is
/// yielded whatever its extension. Entries that cannot be read are logged and skipped.
pub fn text_files(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && (entry.depth() == 0 || is_text_file(entry.path())))
        .map(|entry| entry.into_path())
}

/// Stem `path` line by line into `index`, numbering positions across lines from 1.
///
/// Returns the number of words read.
pub fn index_file(path: &Path, index: &mut InvertedIndex) -> Result<usize> {
    let location = path.display().to_string();
    let f = File::open(path).with_context(|| format!("opening {location}"))?;
    let mut position = 1;
    for line in BufReader::new(f).lines() {
        let line = line.with_context(|| format!("reading {location}"))?;
        let words = stems(&line);
        index.add_all(&words, &location, position);
        position += words.len();
    }
    Ok(position - 1)
}

fn check_root(root: &Path) -> Result<()> {
    if !root.exists() {
        bail!("{} does not exist", root.display());
    }
    Ok(())
}

/// Index every text file under `root` on the calling thread.
///
/// Files that fail to read are logged and skipped; returns how many were indexed.
pub fn build_index(root: &Path, index: &mut InvertedIndex) -> Result<usize> {
    check_root(root)?;
    let mut files = 0;
    for path in text_files(root) {
        match index_file(&path, index) {
            Ok(words) => {
                files += 1;
                tracing::debug!(path = %path.display(), words, "indexed file");
            }
            Err(err) => tracing::warn!("skipping file: {err:#}"),
        }
    }
    tracing::info!(files, num_terms = index.word_count(), "indexed files");
    Ok(files)
}

/// Index every text file under `root` with one task per file on `queue`, then
/// wait for the queue to drain.
///
/// Each task builds a private index for its file and merges it only once the whole
/// file has been read, so a failing file leaves no partial entries behind.
/// Returns how many files were dispatched.
pub fn build_index_concurrent(root: &Path, index: &Arc<ConcurrentIndex>, queue: &WorkQueue) -> Result<usize> {
    check_root(root)?;
    let mut files = 0;
    for path in text_files(root) {
        let index = Arc::clone(index);
        queue.execute(move || {
            let mut local = InvertedIndex::new();
            let words = index_file(&path, &mut local)?;
            index.merge(local);
            tracing::debug!(path = %path.display(), words, "indexed file");
            Ok(())
        });
        files += 1;
    }
    queue.finish();
    tracing::info!(files, num_terms = index.word_count(), "indexed files");
    Ok(files)
}

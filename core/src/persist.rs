use crate::{InvertedIndex, SearchResult, WordCounts};
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::collections::BTreeMap;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Query key -> ranked results.
pub type QueryResults = BTreeMap<String, Vec<SearchResult>>;

/// Pretty JSON, one key per line, indented with tabs.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    write_pretty(value, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

fn write_pretty<T: Serialize + ?Sized, W: Write>(value: &T, writer: W) -> Result<()> {
    let mut ser = Serializer::with_formatter(writer, PrettyFormatter::with_indent(b"\t"));
    value.serialize(&mut ser)?;
    Ok(())
}

fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        create_dir_all(dir)?;
    }
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(f);
    write_pretty(value, &mut out)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

/// word -> location -> [positions]
pub fn save_index(path: &Path, index: &InvertedIndex) -> Result<()> {
    save_json(path, index)?;
    tracing::info!(path = %path.display(), words = index.word_count(), "wrote index");
    Ok(())
}

/// location -> total word count
pub fn save_counts(path: &Path, counts: &WordCounts) -> Result<()> {
    save_json(path, counts)?;
    tracing::info!(path = %path.display(), locations = counts.len(), "wrote word counts");
    Ok(())
}

/// query -> [{where, count, score}]
pub fn save_results(path: &Path, results: &QueryResults) -> Result<()> {
    save_json(path, results)?;
    tracing::info!(path = %path.display(), queries = results.len(), "wrote search results");
    Ok(())
}

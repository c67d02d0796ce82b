//! JSON output for the index, word counts and query results.
//!
//! All structures are sorted maps, so output is byte-for-byte reproducible
//! regardless of how many threads built the index. Nesting is indented with
//! tabs.

use crate::error::{EngineError, EngineResult};
use crate::index::concurrent::ConcurrentIndex;
use crate::index::inverted::InvertedIndex;
use crate::index::types::SearchResult;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Query key -> ranked results
pub type QueryResults = BTreeMap<String, Vec<SearchResult>>;

/// Serialize `value` as tab-indented JSON into `writer`
pub fn write_json<T, W>(value: &T, writer: W) -> EngineResult<()>
where
    T: Serialize + ?Sized,
    W: Write,
{
    let formatter = PrettyFormatter::with_indent(b"\t");
    let mut serializer = Serializer::with_formatter(writer, formatter);
    value.serialize(&mut serializer)?;
    Ok(())
}

/// Tab-indented JSON as a string
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> EngineResult<String> {
    let mut buffer = Vec::new();
    write_json(value, &mut buffer)?;
    // serde_json only emits UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Tab-indented JSON written to `path`, replacing any existing file
pub fn write_json_file<T: Serialize + ?Sized>(value: &T, path: &Path) -> EngineResult<()> {
    let file = File::create(path).map_err(|e| EngineError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    write_json(value, &mut writer)?;
    writer.flush().map_err(|e| EngineError::io(path, e))?;
    Ok(())
}

/// Results keyed by query, skipping empty keys
pub fn write_results(results: &QueryResults, path: &Path) -> EngineResult<()> {
    let visible: BTreeMap<&str, &Vec<SearchResult>> = results
        .iter()
        .filter(|(query, _)| !query.is_empty())
        .map(|(query, ranked)| (query.as_str(), ranked))
        .collect();
    write_json_file(&visible, path)
}

impl InvertedIndex {
    /// `word -> location -> [positions]`
    pub fn write_index(&self, path: &Path) -> EngineResult<()> {
        write_json_file(&self.words, path)
    }

    /// `location -> word count`
    pub fn write_counts(&self, path: &Path) -> EngineResult<()> {
        write_json_file(&self.counts, path)
    }

    pub fn index_json(&self) -> EngineResult<String> {
        to_json(&self.words)
    }

    pub fn counts_json(&self) -> EngineResult<String> {
        to_json(&self.counts)
    }
}

impl ConcurrentIndex {
    /// Writes under the read lock so the output is one consistent state
    pub fn write_index(&self, path: &Path) -> EngineResult<()> {
        self.read().write_index(path)
    }

    pub fn write_counts(&self, path: &Path) -> EngineResult<()> {
        self.read().write_counts(path)
    }

    pub fn index_json(&self) -> EngineResult<String> {
        self.read().index_json()
    }

    pub fn counts_json(&self) -> EngineResult<String> {
        self.read().counts_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_index_shape() {
        let mut index = InvertedIndex::new();
        index.add("run", "b.txt", 2);
        index.add("run", "a.txt", 1);
        index.add("jump", "a.txt", 3);

        let json = index.index_json().unwrap();
        assert_eq!(
            json,
            "{\n\t\"jump\": {\n\t\t\"a.txt\": [\n\t\t\t3\n\t\t]\n\t},\n\t\"run\": {\n\t\t\"a.txt\": [\n\t\t\t1\n\t\t],\n\t\t\"b.txt\": [\n\t\t\t2\n\t\t]\n\t}\n}"
        );
    }

    #[test]
    fn test_counts_shape() {
        let mut index = InvertedIndex::new();
        index.add_stems("b.txt", ["x", "y"], 1);
        index.add_stems("a.txt", ["x"], 1);
        assert_eq!(
            index.counts_json().unwrap(),
            "{\n\t\"a.txt\": 1,\n\t\"b.txt\": 2\n}"
        );
    }

    #[test]
    fn test_empty_index() {
        assert_eq!(InvertedIndex::new().index_json().unwrap(), "{}");
    }

    #[test]
    fn test_results_skip_empty_query() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.json");

        let mut hit = SearchResult::new("a.txt");
        hit.update(1, 2);
        let mut results = QueryResults::new();
        results.insert(String::new(), Vec::new());
        results.insert("run".to_string(), vec![hit]);
        write_results(&results, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        let object = parsed.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(object["run"][0]["count"], 1);
        assert_eq!(object["run"][0]["score"], 0.5);
        assert_eq!(object["run"][0]["where"], "a.txt");
    }

    #[test]
    fn test_concurrent_writes_same_bytes() {
        let dir = TempDir::new().unwrap();
        let plain_path = dir.path().join("plain.json");
        let shared_path = dir.path().join("shared.json");

        let mut plain = InvertedIndex::new();
        plain.add_stems("a.txt", ["hello", "world"], 1);
        let shared = ConcurrentIndex::from(plain.clone());

        plain.write_index(&plain_path).unwrap();
        shared.write_index(&shared_path).unwrap();
        assert_eq!(
            std::fs::read(&plain_path).unwrap(),
            std::fs::read(&shared_path).unwrap()
        );
    }
}

//! Query processing: each line becomes a canonical stem set which is
//! searched at most once.

pub mod parser;

pub use parser::{query_key, ConcurrentQueryParser, QueryParser};

use crate::error::{EngineError, EngineResult};
use crate::index::writer;
use crate::index::QueryResults;
use std::fs;
use std::path::Path;

/// Shared surface of the sequential and the pooled query parser
pub trait QueryProcessor {
    /// Stem one line and search it unless its key was already seen
    fn parse_line(&mut self, line: &str) -> EngineResult<()>;

    /// Wait for outstanding searches
    fn finish(&self) {}

    /// Completed results keyed by query
    fn results(&self) -> QueryResults;

    /// Every line of `path`, then [`finish`](Self::finish)
    fn parse_file(&mut self, path: &Path) -> EngineResult<()> {
        let content = fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        for line in content.lines() {
            self.parse_line(line)?;
        }
        self.finish();
        Ok(())
    }

    fn write_results(&self, path: &Path) -> EngineResult<()> {
        writer::write_results(&self.results(), path)
    }
}

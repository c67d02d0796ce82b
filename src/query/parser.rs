use crate::error::EngineResult;
use crate::index::{QueryResults, SearchIndex, SearchResult};
use crate::pool::Executor;
use crate::query::QueryProcessor;
use crate::utils::{unique_stems, Stemmer};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

/// Canonical key of a stem set: sorted stems joined by single spaces
pub fn query_key(stems: &BTreeSet<String>) -> String {
    stems.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
}

/// Single-threaded query parser
pub struct QueryParser<'a, I: SearchIndex + ?Sized> {
    index: &'a I,
    stemmer: Arc<dyn Stemmer>,
    exact: bool,
    results: QueryResults,
}

impl<'a, I: SearchIndex + ?Sized> QueryParser<'a, I> {
    pub fn new(index: &'a I, stemmer: Arc<dyn Stemmer>, exact: bool) -> Self {
        Self {
            index,
            stemmer,
            exact,
            results: QueryResults::new(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.results.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&[SearchResult]> {
        self.results.get(key).map(Vec::as_slice)
    }

    pub fn keys(&self) -> Vec<String> {
        self.results.keys().cloned().collect()
    }
}

impl<I: SearchIndex + ?Sized> QueryProcessor for QueryParser<'_, I> {
    fn parse_line(&mut self, line: &str) -> EngineResult<()> {
        let stems = unique_stems(line, self.stemmer.as_ref());
        if stems.is_empty() {
            return Ok(());
        }

        let key = query_key(&stems);
        if !self.results.contains_key(&key) {
            let ranked = self.index.search(&stems, self.exact);
            debug!(query = %key, results = ranked.len(), "searched");
            self.results.insert(key, ranked);
        }
        Ok(())
    }

    fn results(&self) -> QueryResults {
        self.results.clone()
    }
}

/// Result slot for one query key
#[derive(Debug, Clone)]
enum Slot {
    /// Reserved by the task that is computing it
    Pending,
    Ready(Vec<SearchResult>),
}

/// Query parser that runs one pool task per line.
///
/// The first task to see a key reserves it under the results lock and is
/// the only one that searches it; later tasks with the same key return
/// immediately. The search itself runs without that lock held.
pub struct ConcurrentQueryParser<I: SearchIndex + ?Sized + 'static> {
    index: Arc<I>,
    executor: Executor,
    stemmer: Arc<dyn Stemmer>,
    exact: bool,
    slots: Arc<Mutex<BTreeMap<String, Slot>>>,
}

impl<I: SearchIndex + ?Sized + 'static> ConcurrentQueryParser<I> {
    pub fn new(index: Arc<I>, executor: Executor, stemmer: Arc<dyn Stemmer>, exact: bool) -> Self {
        Self {
            index,
            executor,
            stemmer,
            exact,
            slots: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Whether `key` has a completed result
    pub fn contains(&self, key: &str) -> bool {
        matches!(self.slots.lock().get(key), Some(Slot::Ready(_)))
    }

    pub fn get(&self, key: &str) -> Option<Vec<SearchResult>> {
        match self.slots.lock().get(key) {
            Some(Slot::Ready(ranked)) => Some(ranked.clone()),
            _ => None,
        }
    }
}

/// Reserve `key`; true when the caller must compute it
fn reserve(slots: &Mutex<BTreeMap<String, Slot>>, key: &str) -> bool {
    let mut slots = slots.lock();
    if slots.contains_key(key) {
        return false;
    }
    slots.insert(key.to_string(), Slot::Pending);
    true
}

impl<I: SearchIndex + ?Sized + 'static> QueryProcessor for ConcurrentQueryParser<I> {
    fn parse_line(&mut self, line: &str) -> EngineResult<()> {
        let line = line.to_string();
        let index = Arc::clone(&self.index);
        let stemmer = Arc::clone(&self.stemmer);
        let slots = Arc::clone(&self.slots);
        let exact = self.exact;

        self.executor.execute(move || {
            let stems = unique_stems(&line, stemmer.as_ref());
            if stems.is_empty() {
                return;
            }

            let key = query_key(&stems);
            if !reserve(&slots, &key) {
                return;
            }

            let ranked = index.search(&stems, exact);
            debug!(query = %key, results = ranked.len(), "searched");
            slots.lock().insert(key, Slot::Ready(ranked));
        })
    }

    fn finish(&self) {
        self.executor.finish();
    }

    /// Completed results only; a key whose search panicked is left out
    fn results(&self) -> QueryResults {
        self.slots
            .lock()
            .iter()
            .filter_map(|(key, slot)| match slot {
                Slot::Ready(ranked) => Some((key.clone(), ranked.clone())),
                Slot::Pending => None,
            })
            .collect()
    }
}

//! Thread-safe inverted index.
//!
//! Owns an [`InvertedIndex`] behind a read/write lock: any number of readers
//! (accessors and searches) proceed together, while `add` and `add_all`
//! take the lock exclusively. Each public call acquires the lock exactly
//! once and the guard releases it on every exit path, unwinding included.
//! The lock never poisons, so a panic inside one call cannot wedge later
//! ones.

use crate::index::inverted::InvertedIndex;
use crate::index::types::{Position, SearchIndex, SearchResult};
use parking_lot::{RwLock, RwLockReadGuard};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default)]
pub struct ConcurrentIndex {
    index: RwLock<InvertedIndex>,
}

impl ConcurrentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, word: &str, location: &str, position: Position) -> bool {
        self.index.write().add(word, location, position)
    }

    /// Merge a privately built index under a single write acquisition
    pub fn add_all(&self, other: InvertedIndex) {
        if other.is_empty() {
            return;
        }
        self.index.write().add_all(other);
    }

    pub fn size(&self) -> usize {
        self.index.read().size()
    }

    pub fn location_count(&self, word: &str) -> usize {
        self.index.read().location_count(word)
    }

    pub fn position_count(&self, word: &str, location: &str) -> usize {
        self.index.read().position_count(word, location)
    }

    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.index.read().contains_word(word)
    }

    pub fn contains_location(&self, word: &str, location: &str) -> bool {
        self.index.read().contains_location(word, location)
    }

    pub fn contains_position(&self, word: &str, location: &str, position: Position) -> bool {
        self.index.read().contains_position(word, location, position)
    }

    pub fn words(&self) -> Vec<String> {
        self.index.read().words()
    }

    pub fn locations(&self, word: &str) -> Vec<String> {
        self.index.read().locations(word)
    }

    pub fn positions(&self, word: &str, location: &str) -> Vec<Position> {
        self.index.read().positions(word, location)
    }

    pub fn word_count(&self, location: &str) -> usize {
        self.index.read().word_count(location)
    }

    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.index.read().counts()
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> InvertedIndex {
        self.index.read().clone()
    }

    pub fn into_inner(self) -> InvertedIndex {
        self.index.into_inner()
    }

    /// Shared view for writers that must see one consistent state.
    /// Writers are blocked until the guard is dropped.
    pub(super) fn read(&self) -> RwLockReadGuard<'_, InvertedIndex> {
        self.index.read()
    }
}

impl From<InvertedIndex> for ConcurrentIndex {
    fn from(index: InvertedIndex) -> Self {
        Self {
            index: RwLock::new(index),
        }
    }
}

impl SearchIndex for ConcurrentIndex {
    fn exact_search(&self, stems: &BTreeSet<String>) -> Vec<SearchResult> {
        self.index.read().exact_search(stems)
    }

    fn partial_search(&self, stems: &BTreeSet<String>) -> Vec<SearchResult> {
        self.index.read().partial_search(stems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_matches_plain_index() {
        let index = ConcurrentIndex::new();
        index.add("run", "a.txt", 1);
        index.add("jump", "a.txt", 2);

        assert_eq!(index.size(), 2);
        assert_eq!(index.location_count("run"), 1);
        assert!(index.contains_position("run", "a.txt", 1));
        assert_eq!(index.word_count("a.txt"), 2);
    }

    #[test]
    fn test_concurrent_merges_keep_everything() {
        let index = Arc::new(ConcurrentIndex::new());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let index = index.clone();
                thread::spawn(move || {
                    for doc in 0..25 {
                        let mut local = InvertedIndex::new();
                        let location = format!("doc-{t}-{doc}");
                        local.add_stems(&location, ["shared", "word", "shared"], 1);
                        index.add_all(local);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(index.size(), 2);
        assert_eq!(index.location_count("shared"), 200);
        assert_eq!(index.positions("shared", "doc-3-7"), vec![1, 3]);
        assert_eq!(index.counts().len(), 200);
    }

    #[test]
    fn test_readers_run_alongside_writers() {
        let index = Arc::new(ConcurrentIndex::new());
        let writer = {
            let index = index.clone();
            thread::spawn(move || {
                for position in 1..=500 {
                    index.add("tick", "clock", position);
                }
            })
        };

        let stems: BTreeSet<String> = ["tick".to_string()].into();
        let mut last = 0;
        while !writer.is_finished() {
            // Every read observes a consistent, monotonically growing state.
            let results = index.exact_search(&stems);
            if let Some(result) = results.first() {
                assert!(result.count >= last);
                assert!(result.score <= 1.0);
                last = result.count;
            }
        }
        writer.join().unwrap();
        assert_eq!(index.position_count("tick", "clock"), 500);
    }

    #[test]
    fn test_lock_released_after_panic() {
        let index = Arc::new(ConcurrentIndex::new());
        let cloned = index.clone();
        let result = thread::spawn(move || {
            let _guard = cloned.read();
            panic!("reader failed");
        })
        .join();
        assert!(result.is_err());

        // A leaked guard would block this write forever.
        index.add("after", "panic", 1);
        assert!(index.contains_word("after"));
    }

    #[test]
    fn test_write_lock_released_after_panic() {
        let index = Arc::new(ConcurrentIndex::new());
        let cloned = index.clone();
        let result = thread::spawn(move || {
            let mut guard = cloned.index.write();
            guard.add("partial", "doc", 1);
            panic!("writer failed");
        })
        .join();
        assert!(result.is_err());

        index.add("after", "panic", 1);
        assert!(index.contains_word("after"));
        assert!(index.contains_word("partial"));
    }

    #[test]
    fn test_readers_hold_lock_together() {
        let index = Arc::new(ConcurrentIndex::new());
        index.add("run", "a.txt", 1);
        let barrier = Arc::new(Barrier::new(2));

        let readers: Vec<_> = (0..2)
            .map(|_| {
                let index = index.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    let guard = index.read();
                    // Both guards are alive here or neither thread gets past.
                    barrier.wait();
                    guard.size()
                })
            })
            .collect();

        for reader in readers {
            assert_eq!(reader.join().unwrap(), 1);
        }
    }

    #[test]
    fn test_writer_waits_for_reader() {
        let index = Arc::new(ConcurrentIndex::new());
        let written = Arc::new(AtomicBool::new(false));

        let guard = index.read();
        let writer = {
            let index = index.clone();
            let written = written.clone();
            thread::spawn(move || {
                index.add("late", "doc", 1);
                written.store(true, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!written.load(Ordering::SeqCst));
        assert!(!guard.contains_word("late"));
        drop(guard);

        writer.join().unwrap();
        assert!(written.load(Ordering::SeqCst));
        assert!(index.contains_word("late"));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let index = ConcurrentIndex::new();
        index.add("run", "a.txt", 1);
        let snapshot = index.snapshot();
        index.add("jump", "a.txt", 2);
        assert_eq!(snapshot.size(), 1);
        assert_eq!(index.size(), 2);
    }
}

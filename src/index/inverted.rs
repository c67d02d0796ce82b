//! Unsynchronized inverted index: stem -> location -> positions.

use crate::index::types::{Position, SearchIndex, SearchResult};
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

/// In-memory inverted index with per-location word counts.
///
/// Words and locations are kept in sorted maps so every traversal, and
/// therefore every serialized form, is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvertedIndex {
    /// word -> location -> positions
    pub(super) words: BTreeMap<String, BTreeMap<String, BTreeSet<Position>>>,
    /// location -> highest position seen
    pub(super) counts: BTreeMap<String, usize>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `word` at `position` in `location`.
    ///
    /// Returns `false` if the position was already present. The word count
    /// of the location becomes the largest position seen for it.
    pub fn add(&mut self, word: &str, location: &str, position: Position) -> bool {
        let added = self
            .words
            .entry(word.to_string())
            .or_default()
            .entry(location.to_string())
            .or_default()
            .insert(position);

        let count = self.counts.entry(location.to_string()).or_insert(0);
        *count = (*count).max(position);

        added
    }

    /// Add a sequence of stems for one location, numbering them from `start`.
    ///
    /// Returns the next unused position.
    pub fn add_stems<I, S>(&mut self, location: &str, stems: I, start: Position) -> Position
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut position = start;
        for stem in stems {
            self.add(stem.as_ref(), location, position);
            position += 1;
        }
        position
    }

    /// Merge another index into this one.
    ///
    /// Position sets are unioned. Word counts take the larger of the two
    /// values, the same rule `add` applies, so merge order never changes the
    /// result.
    pub fn add_all(&mut self, other: InvertedIndex) {
        for (word, other_locations) in other.words {
            match self.words.get_mut(&word) {
                Some(locations) => {
                    for (location, positions) in other_locations {
                        match locations.get_mut(&location) {
                            Some(existing) => existing.extend(positions),
                            None => {
                                locations.insert(location, positions);
                            }
                        }
                    }
                }
                None => {
                    self.words.insert(word, other_locations);
                }
            }
        }

        for (location, count) in other.counts {
            let existing = self.counts.entry(location).or_insert(0);
            *existing = (*existing).max(count);
        }
    }

    /// Number of distinct words
    pub fn size(&self) -> usize {
        self.words.len()
    }

    /// Number of locations containing `word`
    pub fn location_count(&self, word: &str) -> usize {
        self.words.get(word).map_or(0, BTreeMap::len)
    }

    /// Number of positions of `word` in `location`
    pub fn position_count(&self, word: &str, location: &str) -> usize {
        self.words
            .get(word)
            .and_then(|locations| locations.get(location))
            .map_or(0, BTreeSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.words.contains_key(word)
    }

    pub fn contains_location(&self, word: &str, location: &str) -> bool {
        self.words
            .get(word)
            .is_some_and(|locations| locations.contains_key(location))
    }

    pub fn contains_position(&self, word: &str, location: &str, position: Position) -> bool {
        self.words
            .get(word)
            .and_then(|locations| locations.get(location))
            .is_some_and(|positions| positions.contains(&position))
    }

    /// All words, sorted
    pub fn words(&self) -> Vec<String> {
        self.words.keys().cloned().collect()
    }

    /// Locations containing `word`, sorted
    pub fn locations(&self, word: &str) -> Vec<String> {
        self.words
            .get(word)
            .map(|locations| locations.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Positions of `word` in `location`, ascending
    pub fn positions(&self, word: &str, location: &str) -> Vec<Position> {
        self.words
            .get(word)
            .and_then(|locations| locations.get(location))
            .map(|positions| positions.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Word count of `location`, 0 if it was never indexed
    pub fn word_count(&self, location: &str) -> usize {
        self.counts.get(location).copied().unwrap_or(0)
    }

    /// Copy of the location -> word count map
    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.counts.clone()
    }

    /// Fold the postings of `word` into the per-location accumulators
    fn accumulate<'a>(&'a self, word: &str, lookup: &mut FxHashMap<&'a str, SearchResult>) {
        let Some(locations) = self.words.get(word) else {
            return;
        };

        for (location, positions) in locations {
            let word_count = self.word_count(location);
            lookup
                .entry(location.as_str())
                .or_insert_with(|| SearchResult::new(location.as_str()))
                .update(positions.len(), word_count);
        }
    }

    fn ranked(lookup: FxHashMap<&str, SearchResult>) -> Vec<SearchResult> {
        let mut results: Vec<SearchResult> = lookup.into_values().collect();
        results.sort();
        results
    }
}

impl SearchIndex for InvertedIndex {
    fn exact_search(&self, stems: &BTreeSet<String>) -> Vec<SearchResult> {
        let mut lookup = FxHashMap::default();
        for stem in stems {
            self.accumulate(stem, &mut lookup);
        }
        Self::ranked(lookup)
    }

    fn partial_search(&self, stems: &BTreeSet<String>) -> Vec<SearchResult> {
        // Keys are sorted, so the words sharing a prefix form one contiguous
        // run starting at the prefix itself. A word reached through two
        // overlapping stems is still counted once.
        let mut matched: BTreeSet<&str> = BTreeSet::new();
        for stem in stems {
            let run = self
                .words
                .range::<str, _>((Bound::Included(stem.as_str()), Bound::Unbounded))
                .map(|(word, _)| word.as_str())
                .take_while(|word| word.starts_with(stem.as_str()));
            matched.extend(run);
        }

        let mut lookup = FxHashMap::default();
        for word in matched {
            self.accumulate(word, &mut lookup);
        }
        Self::ranked(lookup)
    }
}

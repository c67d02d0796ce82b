use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// 1-based position of a stem within its location
pub type Position = usize;

/// Read-only search surface shared by the plain and the thread-safe index.
///
/// Query parsers are written against this trait so they work with either.
pub trait SearchIndex: Send + Sync {
    /// Locations containing any of `stems` exactly
    fn exact_search(&self, stems: &BTreeSet<String>) -> Vec<SearchResult>;

    /// Locations containing any word that starts with one of `stems`
    fn partial_search(&self, stems: &BTreeSet<String>) -> Vec<SearchResult>;

    fn search(&self, stems: &BTreeSet<String>, exact: bool) -> Vec<SearchResult> {
        if exact {
            self.exact_search(stems)
        } else {
            self.partial_search(stems)
        }
    }
}

/// A ranked match of one query against one location.
///
/// Ordering is best-first: higher score, then higher count, then location
/// compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Number of matching positions
    pub count: usize,
    /// `count` divided by the word count of the location
    #[serde(serialize_with = "serialize_score")]
    pub score: f64,
    #[serde(rename = "where")]
    pub location: String,
}

impl SearchResult {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            count: 0,
            score: 0.0,
            location: location.into(),
        }
    }

    /// Record `matches` more positions and recompute the score
    pub fn update(&mut self, matches: usize, word_count: usize) {
        self.count += matches;
        self.score = self.count as f64 / word_count.max(1) as f64;
    }
}

impl Eq for SearchResult {}

impl Ord for SearchResult {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.count.cmp(&self.count))
            .then_with(|| cmp_ignore_case(&self.location, &other.location))
            .then_with(|| self.location.cmp(&other.location))
    }
}

impl PartialOrd for SearchResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

fn serialize_score<S: Serializer>(score: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64((score * 1e8).round() / 1e8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(location: &str, count: usize, word_count: usize) -> SearchResult {
        let mut r = SearchResult::new(location);
        r.update(count, word_count);
        r
    }

    #[test]
    fn test_update_accumulates() {
        let mut r = SearchResult::new("a.txt");
        r.update(2, 10);
        r.update(3, 10);
        assert_eq!(r.count, 5);
        assert!((r.score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_order_by_score_then_count_then_location() {
        let mut results = vec![
            result("b.txt", 1, 4),  // 0.25
            result("a.txt", 1, 2),  // 0.5
            result("C.txt", 2, 8),  // 0.25, more matches
            result("c.txt", 1, 4),  // 0.25
            result("B.txt", 1, 4),  // 0.25
        ];
        results.sort();

        let order: Vec<_> = results.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(order, vec!["a.txt", "C.txt", "B.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_case_insensitive_location_tiebreak() {
        let mut results = vec![result("Zeta", 1, 1), result("alpha", 1, 1)];
        results.sort();
        assert_eq!(results[0].location, "alpha");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_string(&result("a.txt", 1, 3)).unwrap();
        assert_eq!(json, r#"{"count":1,"score":0.33333333,"where":"a.txt"}"#);
    }
}

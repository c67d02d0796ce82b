//! # stemdex - concurrent stemmed inverted index
//!
//! Builds an in-memory inverted index (`word -> location -> positions`)
//! from text files or crawled web pages and answers exact or prefix
//! queries ranked by how much of each location the query covers.
//!
//! ## Architecture
//!
//! - [`pool`] - fixed-size worker pool with a recursion-safe barrier
//! - [`index`] - the index core, its thread-safe wrapper, builders, JSON output
//! - [`crawl`] - bounded breadth-first crawler feeding the shared index
//! - [`query`] - line-by-line query parsing with per-key deduplication
//! - [`utils`] - tokenizer, stemmer and progress display
//! - [`config`] - engine settings from file, environment and defaults
//!
//! ## Quick Start
//!
//! ```
//! use stemdex::index::{InvertedIndex, SearchIndex};
//! use stemdex::utils::{list_stems, unique_stems, SnowballStemmer};
//!
//! let stemmer = SnowballStemmer::default();
//! let mut index = InvertedIndex::new();
//! index.add_stems("a.txt", list_stems("Dogs running, dogs jumping", &stemmer), 1);
//!
//! let ranked = index.search(&unique_stems("dog", &stemmer), true);
//! assert_eq!(ranked[0].count, 2);
//! assert_eq!(ranked[0].score, 0.5);
//! ```
//!
//! ## Concurrency
//!
//! Builder and crawler tasks each index into a private [`index::InvertedIndex`]
//! and merge it into the shared [`index::ConcurrentIndex`] with a single
//! write-lock acquisition. Callers wait on [`pool::WorkQueue::finish`] before
//! reading results.

pub mod config;
pub mod crawl;
pub mod error;
pub mod index;
pub mod output;
pub mod pool;
pub mod query;
pub mod utils;

pub use error::{EngineError, EngineResult};

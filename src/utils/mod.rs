//! Text utilities shared by the builders, the crawler and the query parsers.
//!
//! ## Modules
//!
//! - [`tokenizer`] - Text cleaning and word splitting
//! - [`stemmer`] - Injectable stemming (`Stemmer` trait, Snowball default)
//! - [`progress`] - Optional terminal spinners
//!
//! ## Key Functions
//!
//! ```
//! use stemdex::utils::{list_stems, unique_stems, SnowballStemmer};
//!
//! let stemmer = SnowballStemmer::default();
//!
//! // Stems in reading order, used to assign positions
//! assert_eq!(list_stems("Running, runs!", &stemmer), vec!["run", "run"]);
//!
//! // Sorted unique stems, used for queries
//! let query: Vec<_> = unique_stems("jumping runners jump", &stemmer).into_iter().collect();
//! assert_eq!(query, vec!["jump", "runner"]);
//! ```

pub mod progress;
pub mod stemmer;
pub mod tokenizer;

pub use stemmer::*;
pub use tokenizer::*;

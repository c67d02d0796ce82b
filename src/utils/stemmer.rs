//! Stemming behind an injectable trait.

use rust_stemmers::Algorithm;
use std::fmt;

/// Reduces a cleaned, lowercase token to its stem.
///
/// Implementations are shared across worker threads.
pub trait Stemmer: Send + Sync {
    fn stem(&self, word: &str) -> String;
}

/// Snowball stemmer, English by default
#[derive(Clone, Copy)]
pub struct SnowballStemmer {
    algorithm: Algorithm,
}

impl SnowballStemmer {
    pub fn new(algorithm: Algorithm) -> Self {
        Self { algorithm }
    }
}

impl fmt::Debug for SnowballStemmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowballStemmer").finish_non_exhaustive()
    }
}

impl Default for SnowballStemmer {
    fn default() -> Self {
        Self::new(Algorithm::English)
    }
}

impl Stemmer for SnowballStemmer {
    fn stem(&self, word: &str) -> String {
        rust_stemmers::Stemmer::create(self.algorithm)
            .stem(word)
            .into_owned()
    }
}

/// Leaves tokens untouched. Handy when positions matter more than recall.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityStemmer;

impl Stemmer for IdentityStemmer {
    fn stem(&self, word: &str) -> String {
        word.to_string()
    }
}

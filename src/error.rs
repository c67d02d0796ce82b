//! Error types shared by the library modules.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the index, pool and crawler.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The crawl seed could not be parsed as an absolute http(s) URL.
    #[error("invalid seed url {url:?}: {reason}")]
    InvalidSeed { url: String, reason: String },

    /// A file or directory could not be read or written.
    #[error("i/o error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output could not be serialized.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    /// The HTTP client could not be constructed.
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Work was submitted after the pool was shut down.
    #[error("work queue has been shut down")]
    PoolShutDown,

    /// A worker thread could not be started.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}

impl EngineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

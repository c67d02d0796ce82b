//! Engine configuration.
//!
//! Values are resolved with priority: command line > environment variables >
//! `config.toml` in the platform config directory > defaults.

use crate::pool::DEFAULT_THREADS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Default crawl limit (the seed alone)
pub const DEFAULT_MAX_URLS: usize = 1;

/// Default number of redirects followed per fetch
pub const DEFAULT_REDIRECTS: usize = 3;

/// Default fetch timeout in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Extensions indexed when none are configured
pub const DEFAULT_TEXT_EXTENSIONS: &[&str] = &["txt", "text"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker threads for the concurrent engine
    pub threads: usize,
    /// Maximum number of URLs a crawl may visit, seed included
    pub max_urls: usize,
    /// Redirects followed before a fetch is abandoned
    pub redirects: usize,
    /// Per-request timeout
    pub fetch_timeout_secs: u64,
    /// File extensions treated as text, matched case-insensitively
    pub text_extensions: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            max_urls: DEFAULT_MAX_URLS,
            redirects: DEFAULT_REDIRECTS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            text_extensions: DEFAULT_TEXT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

/// Layout of `config.toml`
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    engine: EngineSection,
}

#[derive(Debug, Default, Deserialize)]
struct EngineSection {
    threads: Option<usize>,
    max_urls: Option<usize>,
    redirects: Option<usize>,
    fetch_timeout_secs: Option<u64>,
    text_extensions: Option<Vec<String>>,
}

impl EngineConfig {
    /// Location of the optional config file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stemdex").join("config.toml"))
    }

    /// Load config with priority: environment variables > config file > defaults
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(file) = Self::config_path().and_then(|path| Self::read_file(&path)) {
            config.apply_file(file);
        }
        config.apply_env(|key| std::env::var(key).ok());
        config.normalize();
        config
    }

    fn read_file(path: &std::path::Path) -> Option<ConfigFile> {
        let content = fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(file) => Some(file),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                None
            }
        }
    }

    fn apply_file(&mut self, file: ConfigFile) {
        let section = file.engine;
        if let Some(v) = section.threads {
            self.threads = v;
        }
        if let Some(v) = section.max_urls {
            self.max_urls = v;
        }
        if let Some(v) = section.redirects {
            self.redirects = v;
        }
        if let Some(v) = section.fetch_timeout_secs {
            self.fetch_timeout_secs = v;
        }
        if let Some(v) = section.text_extensions {
            self.text_extensions = v;
        }
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(n) = var("STEMDEX_THREADS").and_then(|v| v.parse().ok()) {
            self.threads = n;
        }
        if let Some(n) = var("STEMDEX_MAX_URLS").and_then(|v| v.parse().ok()) {
            self.max_urls = n;
        }
        if let Some(n) = var("STEMDEX_REDIRECTS").and_then(|v| v.parse().ok()) {
            self.redirects = n;
        }
    }

    /// Replace unusable values with defaults
    pub fn normalize(&mut self) {
        if self.threads == 0 {
            self.threads = DEFAULT_THREADS;
        }
        if self.max_urls == 0 {
            self.max_urls = DEFAULT_MAX_URLS;
        }
        if self.text_extensions.is_empty() {
            self.text_extensions = Self::default().text_extensions;
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

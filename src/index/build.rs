use crate::config::DEFAULT_TEXT_EXTENSIONS;
use crate::index::concurrent::ConcurrentIndex;
use crate::index::inverted::InvertedIndex;
use crate::pool::WorkQueue;
use crate::utils::{stem_line, Stemmer};
use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Decides which files in a directory walk are indexed
#[derive(Debug, Clone)]
pub struct TextFilter {
    globs: GlobSet,
}

impl TextFilter {
    /// Match files by extension (without the dot), ignoring case
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for ext in extensions {
            let pattern = format!("*.{}", ext.as_ref().trim_start_matches('.'));
            let glob = GlobBuilder::new(&pattern)
                .case_insensitive(true)
                .literal_separator(false)
                .build()
                .with_context(|| format!("Invalid text extension: {}", ext.as_ref()))?;
            builder.add(glob);
        }
        Ok(Self {
            globs: builder.build().context("Failed to build text file matcher")?,
        })
    }

    pub fn is_text_file(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| self.globs.is_match(name))
    }
}

impl Default for TextFilter {
    fn default() -> Self {
        Self::new(DEFAULT_TEXT_EXTENSIONS).expect("default text extensions are valid globs")
    }
}

/// Outcome of a build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Files indexed successfully
    pub files: usize,
    /// Files that could not be read
    pub failed: usize,
}

/// Files to index under `start`: the path itself when it is a file,
/// otherwise every matching regular file below it in sorted walk order.
pub fn collect_files(start: &Path, filter: &TextFilter) -> Result<Vec<PathBuf>> {
    let metadata = fs::metadata(start)
        .with_context(|| format!("Cannot read input path: {}", start.display()))?;

    if !metadata.is_dir() {
        return Ok(vec![start.to_path_buf()]);
    }

    // Index everything below the root: no ignore files, hidden files included.
    let walker = WalkBuilder::new(start)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) => {
                let is_file = entry.file_type().is_some_and(|t| t.is_file());
                if is_file && filter.is_text_file(entry.path()) {
                    files.push(entry.into_path());
                }
            }
            Err(e) => warn!(error = %e, "skipping unreadable directory entry"),
        }
    }

    Ok(files)
}

/// Location string recorded for a file
pub fn location_of(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Read one file and add its stems to `index`, positions starting at 1.
///
/// The whole file is read before anything is added, so an unreadable file
/// leaves `index` untouched.
pub fn index_file<S: Stemmer + ?Sized>(
    path: &Path,
    index: &mut InvertedIndex,
    stemmer: &S,
) -> Result<usize> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let location = location_of(path);
    let mut stems = Vec::new();
    let mut position = 1;
    for line in content.lines() {
        stems.clear();
        stem_line(line, stemmer, &mut stems);
        position = index.add_stems(&location, &stems, position);
    }

    Ok(position - 1)
}

/// Build single-threaded, adding directly into `index`
pub fn build<S: Stemmer + ?Sized>(
    start: &Path,
    index: &mut InvertedIndex,
    filter: &TextFilter,
    stemmer: &S,
) -> Result<BuildSummary> {
    let files = collect_files(start, filter)?;
    let mut summary = BuildSummary::default();

    for path in &files {
        match index_file(path, index, stemmer) {
            Ok(words) => {
                debug!(path = %path.display(), words, "indexed file");
                summary.files += 1;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping file");
                summary.failed += 1;
            }
        }
    }

    info!(files = summary.files, failed = summary.failed, "build complete");
    Ok(summary)
}

/// Build with one pool task per file.
///
/// Traversal happens on the calling thread. Each task indexes its file
/// into a private index and merges it with a single `add_all`, so the
/// shared lock is taken once per file and a failed file contributes
/// nothing. Returns after the pool has drained.
pub fn build_concurrent(
    start: &Path,
    index: &Arc<ConcurrentIndex>,
    queue: &WorkQueue,
    filter: &TextFilter,
    stemmer: Arc<dyn Stemmer>,
) -> Result<BuildSummary> {
    let files = collect_files(start, filter)?;

    let indexed = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));

    for path in files {
        let index = Arc::clone(index);
        let stemmer = Arc::clone(&stemmer);
        let indexed = Arc::clone(&indexed);
        let failed = Arc::clone(&failed);

        queue.execute(move || {
            let mut local = InvertedIndex::new();
            match index_file(&path, &mut local, stemmer.as_ref()) {
                Ok(words) => {
                    index.add_all(local);
                    indexed.fetch_add(1, Ordering::Relaxed);
                    debug!(path = %path.display(), words, "indexed file");
                }
                Err(e) => {
                    failed.fetch_add(1, Ordering::Relaxed);
                    warn!(path = %path.display(), error = %e, "skipping file");
                }
            }
        })?;
    }

    queue.finish();

    let summary = BuildSummary {
        files: indexed.load(Ordering::Relaxed),
        failed: failed.load(Ordering::Relaxed),
    };
    info!(files = summary.files, failed = summary.failed, threads = queue.size(), "build complete");
    Ok(summary)
}

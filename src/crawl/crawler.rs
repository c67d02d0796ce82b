//! Bounded breadth-first web crawler.
//!
//! Every page is a pool task. A task fetches its page, reserves newly
//! discovered links in the frontier, schedules them, then indexes the
//! page text privately and merges it with one `add_all`.

use crate::crawl::fetch::PageFetcher;
use crate::crawl::html::{strip_block_elements, strip_html};
use crate::crawl::links::{find_links, normalize};
use crate::error::{EngineError, EngineResult};
use crate::index::{ConcurrentIndex, InvertedIndex};
use crate::pool::Executor;
use crate::utils::{list_stems, Stemmer};
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Visited URLs, capped at `max`.
///
/// Check and insert happen under one lock acquisition, so the set never
/// exceeds `max` and no URL is handed out twice.
#[derive(Debug)]
pub struct Frontier {
    visited: Mutex<FxHashSet<Url>>,
    max: usize,
}

impl Frontier {
    pub fn new(max: usize) -> Self {
        Self {
            visited: Mutex::new(FxHashSet::default()),
            max: max.max(1),
        }
    }

    /// Mark `url` visited if there is room and it is new
    pub fn reserve(&self, url: Url) -> bool {
        let mut visited = self.visited.lock();
        visited.len() < self.max && visited.insert(url)
    }

    /// Reserve links in order until the cap is hit, returning the ones
    /// this caller now owns
    pub fn reserve_all(&self, links: impl IntoIterator<Item = Url>) -> Vec<Url> {
        let mut fresh = Vec::new();
        let mut visited = self.visited.lock();
        for link in links {
            if visited.len() >= self.max {
                break;
            }
            if visited.insert(link.clone()) {
                fresh.push(link);
            }
        }
        fresh
    }

    pub fn len(&self) -> usize {
        self.visited.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.lock().is_empty()
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.visited.lock().contains(url)
    }

    pub fn max(&self) -> usize {
        self.max
    }
}

/// Totals over the lifetime of a crawler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// URLs reserved in the frontier
    pub visited: usize,
    /// Pages fetched and merged into the index
    pub indexed: usize,
    /// Pages whose fetch produced nothing, or that could not be scheduled
    pub failed: usize,
}

struct Inner {
    index: Arc<ConcurrentIndex>,
    executor: Executor,
    fetcher: Arc<dyn PageFetcher>,
    stemmer: Arc<dyn Stemmer>,
    frontier: Frontier,
    indexed: AtomicUsize,
    failed: AtomicUsize,
}

/// Crawls into a shared index using a worker pool
#[derive(Clone)]
pub struct WebCrawler {
    inner: Arc<Inner>,
}

impl WebCrawler {
    pub fn new(
        index: Arc<ConcurrentIndex>,
        executor: Executor,
        fetcher: Arc<dyn PageFetcher>,
        stemmer: Arc<dyn Stemmer>,
        max_urls: usize,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                index,
                executor,
                fetcher,
                stemmer,
                frontier: Frontier::new(max_urls),
                indexed: AtomicUsize::new(0),
                failed: AtomicUsize::new(0),
            }),
        }
    }

    /// Crawl from `seed` and block until the whole task graph has drained.
    ///
    /// A seed that is not an absolute http(s) URL is rejected before any
    /// work is scheduled. Must not be called from inside a pool task.
    pub fn crawl(&self, seed: &str) -> EngineResult<CrawlSummary> {
        let seed = parse_seed(seed)?;

        if self.inner.frontier.reserve(seed.clone()) {
            info!(%seed, max = self.inner.frontier.max(), "crawl started");
            if let Err(e) = spawn(&self.inner, seed) {
                self.inner.failed.fetch_add(1, Ordering::Relaxed);
                return Err(e);
            }
        } else {
            debug!(%seed, "seed already visited");
        }

        self.inner.executor.finish();

        let summary = self.summary();
        info!(
            visited = summary.visited,
            indexed = summary.indexed,
            failed = summary.failed,
            "crawl complete"
        );
        Ok(summary)
    }

    pub fn summary(&self) -> CrawlSummary {
        CrawlSummary {
            visited: self.inner.frontier.len(),
            indexed: self.inner.indexed.load(Ordering::Relaxed),
            failed: self.inner.failed.load(Ordering::Relaxed),
        }
    }

    /// Size of the visited set right now; safe to call while crawling
    pub fn visited_count(&self) -> usize {
        self.inner.frontier.len()
    }

    pub fn has_visited(&self, url: &Url) -> bool {
        self.inner.frontier.contains(url)
    }

    pub fn index(&self) -> &Arc<ConcurrentIndex> {
        &self.inner.index
    }
}

/// Absolute http(s) URL without fragment
pub fn parse_seed(seed: &str) -> EngineResult<Url> {
    let invalid = |reason: String| EngineError::InvalidSeed {
        url: seed.to_string(),
        reason,
    };

    let url = Url::parse(seed.trim()).map_err(|e| invalid(e.to_string()))?;
    let scheme = url.scheme().to_string();
    normalize(url).ok_or_else(|| invalid(format!("unsupported scheme {scheme:?}")))
}

fn spawn(inner: &Arc<Inner>, url: Url) -> EngineResult<()> {
    let task = Arc::clone(inner);
    inner.executor.execute(move || process(&task, url))
}

fn process(inner: &Arc<Inner>, url: Url) {
    let Some(html) = inner.fetcher.fetch(&url) else {
        inner.failed.fetch_add(1, Ordering::Relaxed);
        debug!(%url, "no content");
        return;
    };

    let html = strip_block_elements(&html);

    // Frontier lock is released before any task is scheduled.
    let fresh = inner.frontier.reserve_all(find_links(&url, &html));
    for link in fresh {
        if let Err(e) = spawn(inner, link) {
            // Reserved but never fetched: account for it as a failure.
            inner.failed.fetch_add(1, Ordering::Relaxed);
            warn!(%url, error = %e, "dropping discovered link");
        }
    }

    let location = url.to_string();
    let stems = list_stems(&strip_html(&html), inner.stemmer.as_ref());
    let mut local = InvertedIndex::new();
    let words = local.add_stems(&location, &stems, 1) - 1;
    inner.index.add_all(local);
    inner.indexed.fetch_add(1, Ordering::Relaxed);

    debug!(%url, words, "indexed page");
}

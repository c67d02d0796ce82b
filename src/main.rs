use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stemdex::config::EngineConfig;
use stemdex::crawl::{HttpFetcher, WebCrawler};
use stemdex::index::{
    build, build_concurrent, ConcurrentIndex, InvertedIndex, QueryResults, SearchIndex,
    TextFilter,
};
use stemdex::output;
use stemdex::pool::{WorkQueue, DEFAULT_THREADS};
use stemdex::query::{query_key, ConcurrentQueryParser, QueryParser, QueryProcessor};
use stemdex::utils::progress::Activity;
use stemdex::utils::{unique_stems, SnowballStemmer, Stemmer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stemdex")]
#[command(about = "Stemmed inverted index over text files and web pages")]
#[command(version)]
struct Cli {
    /// Build the index from a text file or directory
    #[arg(long, value_name = "PATH")]
    text: Option<PathBuf>,

    /// Crawl from this seed URL (implies --threads)
    #[arg(long, value_name = "URL")]
    html: Option<String>,

    /// Maximum number of URLs to crawl, seed included
    #[arg(long, value_name = "N")]
    max: Option<usize>,

    /// Use the concurrent engine, optionally with N worker threads
    /// (N <= 0 uses the default)
    #[arg(long, value_name = "N", num_args = 0..=1, allow_negative_numbers = true)]
    threads: Option<Option<i64>>,

    /// Write the index as JSON
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "index.json")]
    index: Option<PathBuf>,

    /// Write per-location word counts as JSON
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "counts.json")]
    counts: Option<PathBuf>,

    /// Run every line of this file as a query
    #[arg(long, value_name = "PATH")]
    query: Option<PathBuf>,

    /// Match whole stems only instead of prefixes
    #[arg(long)]
    exact: bool,

    /// Write query results as JSON
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "results.json")]
    results: Option<PathBuf>,

    /// Run one query and print the ranked results
    #[arg(long, value_name = "TEXT")]
    search: Option<String>,

    /// Log progress (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn concurrent(&self) -> bool {
        self.threads.is_some() || self.html.is_some()
    }

    /// Command line values take priority over config file and environment
    fn apply(&self, config: &mut EngineConfig) {
        if let Some(Some(threads)) = self.threads {
            config.threads = usize::try_from(threads)
                .ok()
                .filter(|&n| n > 0)
                .unwrap_or(DEFAULT_THREADS);
        }
        if let Some(max) = self.max {
            config.max_urls = max;
        }
        config.normalize();
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = EngineConfig::load();
    cli.apply(&mut config);
    info!(?config, "configuration");

    let filter = TextFilter::new(&config.text_extensions)?;
    let stemmer: Arc<dyn Stemmer> = Arc::new(SnowballStemmer::default());

    if cli.concurrent() {
        run_concurrent(&cli, &config, &filter, stemmer)
    } else {
        run_sequential(&cli, &filter, stemmer)
    }
}

fn run_sequential(cli: &Cli, filter: &TextFilter, stemmer: Arc<dyn Stemmer>) -> Result<()> {
    let mut index = InvertedIndex::new();

    if let Some(path) = &cli.text {
        let activity = Activity::start(format!("Indexing {}", path.display()));
        match build(path, &mut index, filter, stemmer.as_ref()) {
            Ok(summary) => activity.finish(format!("Indexed {} files", summary.files)),
            Err(e) => {
                activity.finish("Build failed");
                report(&format!("Unable to build from {}", path.display()), &e);
            }
        }
    }

    if let Some(path) = &cli.index {
        write_or_report(path, "index", || index.write_index(path));
    }
    if let Some(path) = &cli.counts {
        write_or_report(path, "counts", || index.write_counts(path));
    }

    let mut parser = QueryParser::new(&index, Arc::clone(&stemmer), cli.exact);
    run_queries(cli, &mut parser);

    if let Some(text) = &cli.search {
        print_search(&index, stemmer.as_ref(), text, cli.exact)?;
    }
    Ok(())
}

fn run_concurrent(
    cli: &Cli,
    config: &EngineConfig,
    filter: &TextFilter,
    stemmer: Arc<dyn Stemmer>,
) -> Result<()> {
    let queue = WorkQueue::new(config.threads).context("Failed to start worker pool")?;
    let index = Arc::new(ConcurrentIndex::new());
    info!(threads = queue.size(), "worker pool started");

    if let Some(path) = &cli.text {
        let activity = Activity::start(format!("Indexing {}", path.display()));
        match build_concurrent(path, &index, &queue, filter, Arc::clone(&stemmer)) {
            Ok(summary) => activity.finish(format!("Indexed {} files", summary.files)),
            Err(e) => {
                activity.finish("Build failed");
                report(&format!("Unable to build from {}", path.display()), &e);
            }
        }
    }

    if let Some(seed) = &cli.html {
        crawl(seed, config, &index, &queue, Arc::clone(&stemmer));
    }

    if let Some(path) = &cli.index {
        write_or_report(path, "index", || index.write_index(path));
    }
    if let Some(path) = &cli.counts {
        write_or_report(path, "counts", || index.write_counts(path));
    }

    let mut parser = ConcurrentQueryParser::new(
        Arc::clone(&index),
        queue.executor(),
        Arc::clone(&stemmer),
        cli.exact,
    );
    run_queries(cli, &mut parser);

    if let Some(text) = &cli.search {
        print_search(index.as_ref(), stemmer.as_ref(), text, cli.exact)?;
    }

    queue.join();
    Ok(())
}

fn crawl(
    seed: &str,
    config: &EngineConfig,
    index: &Arc<ConcurrentIndex>,
    queue: &WorkQueue,
    stemmer: Arc<dyn Stemmer>,
) {
    let fetcher = match HttpFetcher::new(config) {
        Ok(fetcher) => Arc::new(fetcher),
        Err(e) => {
            report("Unable to create HTTP client", &e);
            return;
        }
    };

    let crawler = WebCrawler::new(
        Arc::clone(index),
        queue.executor(),
        fetcher,
        stemmer,
        config.max_urls,
    );

    let activity = Activity::start(format!("Crawling {seed}"));
    match crawler.crawl(seed) {
        Ok(summary) => activity.finish(format!(
            "Crawled {} pages ({} unavailable)",
            summary.indexed, summary.failed
        )),
        Err(e) => {
            activity.finish("Crawl skipped");
            report(&format!("Unable to crawl {seed}"), &e);
        }
    }
}

fn run_queries<P: QueryProcessor>(cli: &Cli, parser: &mut P) {
    if let Some(path) = &cli.query {
        if let Err(e) = parser.parse_file(path) {
            report(&format!("Unable to read queries from {}", path.display()), &e);
        }
    }
    if let Some(path) = &cli.results {
        write_or_report(path, "results", || parser.write_results(path));
    }
}

fn print_search<I: SearchIndex + ?Sized>(
    index: &I,
    stemmer: &dyn Stemmer,
    text: &str,
    exact: bool,
) -> Result<()> {
    let stems = unique_stems(text, stemmer);
    let mut results = QueryResults::new();
    results.insert(query_key(&stems), index.search(&stems, exact));
    output::print_results(&results, std::io::stdout().is_terminal())?;
    Ok(())
}

fn write_or_report<E, F>(path: &Path, what: &str, write: F)
where
    E: std::error::Error,
    F: FnOnce() -> std::result::Result<(), E>,
{
    match write() {
        Ok(()) => info!(path = %path.display(), "wrote {what}"),
        Err(e) => report(&format!("Unable to write {what} to {}", path.display()), &e),
    }
}

fn report(context: &str, err: &dyn std::fmt::Display) {
    error!(error = %err, "{context}");
    eprintln!("{context}: {err:#}");
}

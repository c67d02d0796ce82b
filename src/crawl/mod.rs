//! Web crawling into a shared index.

pub mod crawler;
pub mod fetch;
pub mod html;
pub mod links;

pub use crawler::{parse_seed, CrawlSummary, Frontier, WebCrawler};
pub use fetch::{HttpFetcher, PageFetcher};

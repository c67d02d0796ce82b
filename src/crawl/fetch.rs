//! Page retrieval.

use crate::config::EngineConfig;
use crate::error::EngineResult;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use tracing::debug;
use url::Url;

/// Source of page markup for the crawler.
///
/// `None` means the page is unusable (network failure, non-200 status,
/// non-HTML content). The crawler treats it as a leaf.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> Option<String>;
}

/// Blocking HTTP fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Client that follows at most `redirects` redirects per request
    pub fn new(config: &EngineConfig) -> EngineResult<Self> {
        let client = Client::builder()
            .redirect(Policy::limited(config.redirects))
            .timeout(config.fetch_timeout())
            .user_agent(concat!("stemdex/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Option<String> {
        let response = match self.client.get(url.as_str()).send() {
            Ok(response) => response,
            Err(e) => {
                debug!(%url, error = %e, "fetch failed");
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            debug!(%url, status = %response.status(), "skipping non-200 response");
            return None;
        }

        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(is_html_content_type);
        if !is_html {
            debug!(%url, "skipping non-html response");
            return None;
        }

        response
            .text()
            .inspect_err(|e| debug!(%url, error = %e, "failed to read body"))
            .ok()
    }
}

/// `text/html`, with or without parameters
pub fn is_html_content_type(value: &str) -> bool {
    value
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("text/html"))
}

//! Hyperlink extraction.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static ANCHOR_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*"([^"]*)""#).expect("valid anchor pattern")
});

/// Absolute http(s) links of every anchor in `html`, resolved against
/// `base`, without fragments, in document order.
pub fn find_links(base: &Url, html: &str) -> Vec<Url> {
    ANCHOR_HREF
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .filter_map(|href| base.join(href.as_str().trim()).ok())
        .filter_map(normalize)
        .collect()
}

/// Drop the fragment and reject anything that is not http(s)
pub fn normalize(mut url: Url) -> Option<Url> {
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

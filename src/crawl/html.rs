//! Markup cleanup for crawled pages.
//!
//! Regex based and forgiving: malformed markup degrades to extra
//! whitespace rather than failing.

use regex::Regex;
use std::sync::LazyLock;

/// Elements whose content is never visible text
const BLOCK_ELEMENTS: [&str; 5] = ["head", "style", "script", "noscript", "svg"];

static COMMENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment pattern"));

static ELEMENTS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    BLOCK_ELEMENTS
        .iter()
        .map(|name| {
            Regex::new(&format!(r"(?is)<{name}\b[^>]*>.*?</{name}\s*>"))
                .expect("valid element pattern")
        })
        .collect()
});

static TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag pattern"));

static ENTITIES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&[^\s;]*;").expect("valid entity pattern"));

/// Remove HTML comments
pub fn strip_comments(html: &str) -> String {
    COMMENTS.replace_all(html, " ").into_owned()
}

/// Remove comments and the `head`, `style`, `script`, `noscript` and `svg`
/// elements together with their content.
///
/// Links are extracted after this step, so anchors inside those elements
/// are never followed.
pub fn strip_block_elements(html: &str) -> String {
    let mut cleaned = strip_comments(html);
    for element in ELEMENTS.iter() {
        cleaned = element.replace_all(&cleaned, " ").into_owned();
    }
    cleaned
}

/// Remove any remaining tags
pub fn strip_tags(html: &str) -> String {
    TAGS.replace_all(html, " ").into_owned()
}

/// Remove character entities such as `&amp;` or `&#8212;`
pub fn strip_entities(html: &str) -> String {
    ENTITIES.replace_all(html, " ").into_owned()
}

/// Visible text of a page
pub fn strip_html(html: &str) -> String {
    strip_entities(&strip_tags(&strip_block_elements(html)))
}

//! Plain-text helpers used for descriptions and page display.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum excerpt length in characters, ellipsis excluded.
pub const EXCERPT_CHARS: usize = 180;

/// Reading speed used by [`reading_time`].
pub const WORDS_PER_MINUTE: usize = 200;

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<\s*/?\s*([A-Za-z][A-Za-z0-9]*)?[^>]*>").expect("valid tag regex")
});
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Elements that separate words when their markup is removed.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Remove markup tags and collapse runs of whitespace.
///
/// Inline tags vanish without a trace, so `Hel<b>lo</b>` stays one word;
/// block tags leave a space behind.
pub fn strip_tags(html: &str) -> String {
    let text = TAG.replace_all(html, |caps: &regex::Captures| {
        let block = caps.get(1).is_some_and(|name| {
            BLOCK_ELEMENTS
                .iter()
                .any(|b| b.eq_ignore_ascii_case(name.as_str()))
        });
        if block {
            " "
        } else {
            ""
        }
    });
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Plain-text excerpt of `html`.
///
/// Cut at exactly [`EXCERPT_CHARS`] characters, mid-word if need be, with a
/// trailing ellipsis when anything was cut.
pub fn excerpt(html: &str) -> String {
    let text = strip_tags(html);
    if text.chars().count() <= EXCERPT_CHARS {
        return text;
    }

    let mut cut: String = text.chars().take(EXCERPT_CHARS).collect();
    cut.push('…');
    cut
}

/// Estimated reading time, e.g. `"3 min read"`. Never less than a minute.
pub fn reading_time(html: &str) -> String {
    let words = strip_tags(html).split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{} min read", minutes)
}

/// Convert a heading or tag to a URL-safe slug.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

//! Tag splitting and the site-wide tag universe.

use std::collections::BTreeSet;

use crate::resolver::ResolvedMetadata;

/// Collection tags every document carries implicitly: "all documents" and
/// "AsciiDoc documents". They never show up as user-facing tags.
pub const SENTINEL_TAGS: [&str; 2] = ["all", "adoc"];

/// Split a comma-separated tag string, trimming each entry and dropping
/// empty ones. Order and duplicates are kept.
pub fn split_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Sorted, duplicate-free tags across `pages`, without the sentinel tags.
pub fn tag_universe<'a>(pages: impl IntoIterator<Item = &'a ResolvedMetadata>) -> Vec<String> {
    pages
        .into_iter()
        .flat_map(|page| page.tags.iter())
        .filter(|tag| !SENTINEL_TAGS.contains(&tag.as_str()))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

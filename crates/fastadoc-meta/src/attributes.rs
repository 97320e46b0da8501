//! Leading attribute block (`:key: value` lines) of a document.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::derived::{Derived, MetaError};
use crate::frontmatter::body_of;
use crate::resolver::Document;

/// Number of leading lines scanned for attributes.
pub const SCAN_LINES: usize = 80;

static ATTRIBUTE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:([^:]+):(.*)$").expect("valid attribute regex"));

/// Attributes declared at the top of one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeSet {
    values: HashMap<String, String>,
    doctitle: Option<String>,
}

impl AttributeSet {
    /// Parse the attribute block at the top of `body`.
    ///
    /// Blank lines are skipped and heading lines do not end the block. The
    /// first other line ends it, unless it is the very first line.
    pub fn parse(body: &str) -> Self {
        let mut set = Self::default();

        for (index, line) in body.lines().take(SCAN_LINES).enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if line.starts_with(':') {
                if let Some(caps) = ATTRIBUTE_LINE.captures(line) {
                    let name = caps[1].trim();
                    if !name.is_empty() {
                        set.values
                            .insert(name.to_string(), caps[2].trim().to_string());
                    }
                }
                continue;
            }

            if line.starts_with('=') || line.starts_with('#') {
                if set.doctitle.is_none() {
                    set.doctitle = document_title(trimmed);
                }
                continue;
            }

            if index == 0 {
                continue;
            }

            break;
        }

        set
    }

    /// Read and parse the attribute block straight from a file.
    ///
    /// Only the first [`SCAN_LINES`] lines are read. Any read failure yields
    /// an empty set.
    pub fn read(path: &Path) -> Derived<Self> {
        match read_head(path) {
            Ok(head) => Derived::Value(Self::parse(body_of(&head))),
            Err(source) => Derived::Degraded(
                Self::default(),
                MetaError::Io {
                    path: path.to_path_buf(),
                    source,
                },
            ),
        }
    }

    /// Value of the first alias that is set to something non-blank.
    pub fn first_of(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .filter_map(|name| self.values.get(*name))
            .map(String::as_str)
            .find(|value| !value.is_empty())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Text of the level-0 heading (`= Title` or `# Title`), if one was seen.
    pub fn doctitle(&self) -> Option<&str> {
        self.doctitle.as_deref()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn read_head(path: &Path) -> io::Result<String> {
    let reader = BufReader::new(File::open(path)?);
    let mut head = String::new();
    for line in reader.lines().take(SCAN_LINES) {
        head.push_str(&line?);
        head.push('\n');
    }
    Ok(head)
}

fn document_title(line: &str) -> Option<String> {
    let rest = line
        .strip_prefix("= ")
        .or_else(|| line.strip_prefix("# "))?;
    let title = rest.trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// Attribute sets extracted during one resolution pass, keyed by input path.
///
/// Each document is parsed at most once per pass; the cache is dropped with
/// the pass.
#[derive(Debug, Default)]
pub struct AttributeCache {
    entries: HashMap<PathBuf, Derived<AttributeSet>>,
}

impl AttributeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute set for `doc`, extracting it on first use.
    ///
    /// Uses the in-memory body when the document carries one and falls back
    /// to reading the input path otherwise.
    pub fn get_or_extract(&mut self, doc: &Document) -> &AttributeSet {
        self.entries
            .entry(doc.input_path.clone())
            .or_insert_with(|| match &doc.body {
                Some(body) => Derived::Value(AttributeSet::parse(body)),
                None => AttributeSet::read(&doc.input_path),
            })
            .value()
    }

    /// Whether extraction for `path` fell back to an empty set.
    pub fn is_degraded(&self, path: &Path) -> bool {
        self.entries
            .get(path)
            .is_some_and(Derived::is_degraded)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parses_leading_block() {
        let set = AttributeSet::parse(
            "= Post Title\n:author:  Jane Doe \n:tags: a, b\n\n:summary: short\nBody text\n:late: ignored",
        );

        assert_eq!(set.get("author"), Some("Jane Doe"));
        assert_eq!(set.get("tags"), Some("a, b"));
        assert_eq!(set.get("summary"), Some("short"));
        assert_eq!(set.get("late"), None);
        assert_eq!(set.doctitle(), Some("Post Title"));
    }

    #[test]
    fn tolerates_non_attribute_first_line() {
        let set = AttributeSet::parse("Jane Doe <jane@example.com>\n:author: Jane\nbody\n:x: y");

        assert_eq!(set.get("author"), Some("Jane"));
        assert_eq!(set.get("x"), None);
    }

    #[test]
    fn records_empty_values() {
        let set = AttributeSet::parse(":toc:\n:description: \n:summary: fallback\n");

        assert_eq!(set.get("toc"), Some(""));
        assert_eq!(set.first_of(&["description", "summary"]), Some("fallback"));
    }

    #[test]
    fn stops_after_scan_window() {
        let mut body = "\n".repeat(SCAN_LINES);
        body.push_str(":author: too late\n");

        assert!(AttributeSet::parse(&body).is_empty());
    }

    #[test]
    fn reads_from_file_skipping_frontmatter() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("post.adoc");
        fs::write(&path, "---\ntitle: x\n---\n:author: From Disk\n\nBody").unwrap();

        let derived = AttributeSet::read(&path);

        assert!(!derived.is_degraded());
        assert_eq!(derived.value().get("author"), Some("From Disk"));
    }

    #[test]
    fn missing_file_degrades_to_empty() {
        let temp = tempdir().unwrap();

        let derived = AttributeSet::read(&temp.path().join("nope.adoc"));

        assert!(derived.is_degraded());
        assert!(derived.value().is_empty());
    }

    #[test]
    fn cache_extracts_once_per_path() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("a.adoc");
        fs::write(&path, ":author: First\n").unwrap();

        let doc = Document::from_path(&path);
        let mut cache = AttributeCache::new();
        assert_eq!(cache.get_or_extract(&doc).get("author"), Some("First"));

        fs::write(&path, ":author: Second\n").unwrap();
        assert_eq!(cache.get_or_extract(&doc).get("author"), Some("First"));
        assert_eq!(cache.len(), 1);
        assert!(!cache.is_degraded(&path));
    }
}

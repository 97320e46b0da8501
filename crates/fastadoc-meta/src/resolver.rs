//! Page metadata resolution.
//!
//! Each field cascades through the explicit front matter value, then the
//! attribute block under a short list of accepted names, then a computed
//! default. Nothing here fails: a missing or malformed source just leaves
//! the field unset.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::attributes::{AttributeCache, AttributeSet};
use crate::derived::{Derived, MetaError};
use crate::frontmatter::{extract_frontmatter, Frontmatter, TagField};
use crate::tags::split_tags;

/// Layout identifier given to documents under the posts directory.
pub const POST_LAYOUT: &str = "post.html";

const LAYOUT_KEYS: &[&str] = &["layout", "page-layout"];
const AUTHOR_KEYS: &[&str] = &["author", "authors"];
const DESCRIPTION_KEYS: &[&str] = &["description", "summary", "abstract"];
const IMAGE_KEYS: &[&str] = &["image", "cover", "hero", "thumbnail"];
const PROFILE_KEYS: &[&str] = &["profile", "github", "github-user", "github_user"];
const TAG_KEYS: &[&str] = &["tags", "tag", "Tags", "TAGS"];
const DATE_KEYS: &[&str] = &["revdate", "date"];

/// A source document handed to the resolver.
#[derive(Debug, Clone)]
pub struct Document {
    /// Source path, also the document's identity within a pass
    pub input_path: PathBuf,

    /// Markup body without front matter. `None` means "read it from disk".
    pub body: Option<String>,

    /// Explicit fields from front matter
    pub fields: Frontmatter,

    /// Plain-text excerpt of the rendered body, used as a description fallback
    pub excerpt: Option<String>,
}

impl Document {
    /// A document known only by path; attributes are read lazily from disk.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: path.into(),
            body: None,
            fields: Frontmatter::default(),
            excerpt: None,
        }
    }

    /// Split `source` into explicit fields and body.
    ///
    /// Broken front matter degrades to "no explicit fields" with the whole
    /// source kept as the body.
    pub fn from_source(path: impl Into<PathBuf>, source: &str) -> Derived<Self> {
        let input_path = path.into();

        match extract_frontmatter(source) {
            Ok((fields, body)) => Derived::Value(Self {
                input_path,
                body: Some(body.to_string()),
                fields: fields.unwrap_or_default(),
                excerpt: None,
            }),
            Err(source_err) => Derived::Degraded(
                Self {
                    input_path: input_path.clone(),
                    body: Some(source.to_string()),
                    fields: Frontmatter::default(),
                    excerpt: None,
                },
                MetaError::Frontmatter {
                    path: input_path,
                    source: source_err,
                },
            ),
        }
    }

    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }

    fn stem(&self) -> String {
        self.input_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Untitled")
            .to_string()
    }
}

/// Canonical metadata of one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedMetadata {
    pub title: String,
    /// Template identifier; `None` leaves the choice to the renderer
    pub layout: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub profile: Option<String>,
    /// Tags in source order, duplicates kept
    pub tags: Vec<String>,
    pub date: Option<String>,
}

/// Resolves [`ResolvedMetadata`] for documents of one site.
#[derive(Debug, Clone)]
pub struct Resolver {
    posts_dir: PathBuf,
    post_layout: String,
}

impl Resolver {
    /// Create a resolver that treats everything under `posts_dir` as a post.
    pub fn new(posts_dir: impl Into<PathBuf>) -> Self {
        Self {
            posts_dir: posts_dir.into(),
            post_layout: POST_LAYOUT.to_string(),
        }
    }

    /// Override the layout identifier assigned to posts.
    pub fn with_post_layout(mut self, layout: impl Into<String>) -> Self {
        self.post_layout = layout.into();
        self
    }

    pub fn posts_dir(&self) -> &Path {
        &self.posts_dir
    }

    pub fn is_post(&self, doc: &Document) -> bool {
        doc.input_path.starts_with(&self.posts_dir)
    }

    /// Resolve every field of `doc`.
    pub fn resolve(&self, doc: &Document, cache: &mut AttributeCache) -> ResolvedMetadata {
        let attrs = cache.get_or_extract(doc);
        let fields = &doc.fields;

        let description = explicit(&fields.description)
            .or_else(|| attrs.first_of(DESCRIPTION_KEYS).map(str::to_string))
            .or_else(|| doc.excerpt.clone().filter(|e| !e.is_empty()));

        ResolvedMetadata {
            title: explicit(&fields.title)
                .or_else(|| attrs.doctitle().map(str::to_string))
                .unwrap_or_else(|| doc.stem()),
            layout: self.layout(doc, attrs),
            author: field(&fields.author, attrs, AUTHOR_KEYS),
            description,
            image: field(&fields.image, attrs, IMAGE_KEYS),
            profile: field(&fields.profile, attrs, PROFILE_KEYS),
            tags: tags(fields.tags.as_ref(), attrs),
            date: field(&fields.date, attrs, DATE_KEYS),
        }
    }

    fn layout(&self, doc: &Document, attrs: &AttributeSet) -> Option<String> {
        if let Some(layout) = explicit(&doc.fields.layout) {
            return Some(layout);
        }

        if let Some(layout) = attrs.first_of(LAYOUT_KEYS) {
            return Some(layout.to_string());
        }

        self.is_post(doc).then(|| self.post_layout.clone())
    }
}

fn explicit(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

fn field(value: &Option<String>, attrs: &AttributeSet, names: &[&str]) -> Option<String> {
    explicit(value).or_else(|| attrs.first_of(names).map(str::to_string))
}

fn tags(explicit: Option<&TagField>, attrs: &AttributeSet) -> Vec<String> {
    match explicit {
        Some(TagField::List(list)) => list
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        Some(TagField::Text(text)) => split_tags(text),
        None => attrs.first_of(TAG_KEYS).map(split_tags).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(path: &str, source: &str) -> Document {
        Document::from_source(path, source).into_value()
    }

    fn resolve(doc: &Document) -> ResolvedMetadata {
        Resolver::new("src/posts").resolve(doc, &mut AttributeCache::new())
    }

    #[test]
    fn posts_get_post_layout() {
        let meta = resolve(&doc("src/posts/hello.adoc", "= Hello\n\nBody"));

        assert_eq!(meta.layout.as_deref(), Some(POST_LAYOUT));
    }

    #[test]
    fn pages_outside_posts_keep_default_layout() {
        let meta = resolve(&doc("src/about.adoc", "= About\n\nBody"));

        assert_eq!(meta.layout, None);
    }

    #[test]
    fn posts_dir_match_is_by_component() {
        let meta = resolve(&doc("src/posts-archive/old.adoc", "Body"));

        assert_eq!(meta.layout, None);
    }

    #[test]
    fn layout_attribute_overrides_posts_default() {
        let meta = resolve(&doc("src/posts/x.adoc", ":page-layout: wide.html\n\nBody"));

        assert_eq!(meta.layout.as_deref(), Some("wide.html"));
    }

    #[test]
    fn resolves_author_and_tags_from_attributes() {
        let meta = resolve(&doc(
            "src/posts/a.adoc",
            ":author: Jane Doe\n:tags: a, b, b ,c\n\nBody text",
        ));

        assert_eq!(meta.author.as_deref(), Some("Jane Doe"));
        assert_eq!(meta.tags, vec!["a", "b", "b", "c"]);
    }

    #[test]
    fn explicit_fields_always_win() {
        let source = "---\nlayout: custom.html\nauthor: Explicit\ndescription: Given\nimage: /given.png\nprofile: given\ntags: [x]\ndate: 2024-01-01\n---\n\
:layout: other.html\n:author: Derived\n:description: derived\n:image: /derived.png\n:github: derived\n:tags: y, z\n:revdate: 1999-01-01\n\nBody";
        let meta = resolve(&doc("src/posts/e.adoc", source).with_excerpt("excerpt"));

        assert_eq!(meta.layout.as_deref(), Some("custom.html"));
        assert_eq!(meta.author.as_deref(), Some("Explicit"));
        assert_eq!(meta.description.as_deref(), Some("Given"));
        assert_eq!(meta.image.as_deref(), Some("/given.png"));
        assert_eq!(meta.profile.as_deref(), Some("given"));
        assert_eq!(meta.tags, vec!["x"]);
        assert_eq!(meta.date.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn description_falls_back_through_aliases_then_excerpt() {
        let with_abstract = resolve(&doc("p.adoc", ":abstract: The abstract\n\nBody"));
        assert_eq!(with_abstract.description.as_deref(), Some("The abstract"));

        let with_summary = resolve(&doc("p.adoc", ":abstract: A\n:summary: S\n\nBody"));
        assert_eq!(with_summary.description.as_deref(), Some("S"));

        let with_excerpt = resolve(&doc("p.adoc", "= T\n\nBody").with_excerpt("Body"));
        assert_eq!(with_excerpt.description.as_deref(), Some("Body"));

        let nothing = resolve(&doc("p.adoc", "= T\n\nBody"));
        assert_eq!(nothing.description, None);
    }

    #[test]
    fn image_and_profile_aliases() {
        let meta = resolve(&doc("p.adoc", ":cover: /img/c.png\n:github-user: octo\n\nBody"));

        assert_eq!(meta.image.as_deref(), Some("/img/c.png"));
        assert_eq!(meta.profile.as_deref(), Some("octo"));
    }

    #[test]
    fn explicit_tag_string_is_split() {
        let meta = resolve(&doc("p.adoc", "---\ntags: \"one, , two\"\n---\nBody"));

        assert_eq!(meta.tags, vec!["one", "two"]);
    }

    #[test]
    fn alternate_tag_spelling() {
        let meta = resolve(&doc("p.adoc", ":Tags: Rust,Web\n\nBody"));

        assert_eq!(meta.tags, vec!["Rust", "Web"]);
    }

    #[test]
    fn title_cascade() {
        assert_eq!(resolve(&doc("x/first.adoc", "= From Heading\n")).title, "From Heading");
        assert_eq!(
            resolve(&doc("x/first.adoc", "---\ntitle: Given\n---\n= From Heading\n")).title,
            "Given"
        );
        assert_eq!(resolve(&doc("x/first.adoc", "plain body")).title, "first");
    }

    #[test]
    fn broken_frontmatter_degrades() {
        let derived = Document::from_source("p.adoc", "---\ntitle: [oops\n---\n:author: A\n");

        assert!(derived.is_degraded());
        let meta = resolve(derived.value());
        assert_eq!(meta.author, None);
        assert_eq!(meta.title, "p");
    }

    #[test]
    fn unreadable_document_resolves_to_defaults() {
        let meta = resolve(&Document::from_path("src/posts/missing.adoc"));

        assert_eq!(meta.layout.as_deref(), Some(POST_LAYOUT));
        assert_eq!(meta.author, None);
        assert!(meta.tags.is_empty());
    }
}

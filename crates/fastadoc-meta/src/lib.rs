//! Page metadata for fastadoc documents.
//!
//! Reads the optional YAML front matter and the leading `:key: value`
//! attribute block of a document, then resolves the canonical fields the
//! page templates consume (layout, author, description, image, profile
//! handle, tags).

pub mod attributes;
pub mod derived;
pub mod frontmatter;
pub mod resolver;
pub mod tags;
pub mod text;

pub use attributes::{AttributeCache, AttributeSet};
pub use derived::{Derived, MetaError};
pub use frontmatter::{Frontmatter, FrontmatterError, TagField};
pub use resolver::{Document, ResolvedMetadata, Resolver, POST_LAYOUT};
pub use tags::{tag_universe, SENTINEL_TAGS};
pub use text::{excerpt, reading_time, slugify, strip_tags};

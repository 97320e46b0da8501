//! Static site generator for fastadoc blogs.
//!
//! Renders AsciiDoc and Markdown documents through layout templates, using
//! the metadata resolved by `fastadoc-meta` and the site configuration from
//! `fastadoc-settings`.

pub mod adoc;
pub mod assets;
pub mod builder;
pub mod markup;
pub mod templates;

pub use builder::{BuildConfig, BuildError, BuildMode, BuildResult, StaticBuilder};
pub use markup::{MarkupRenderer, RenderError, RendererRegistry};

//! Markup-to-HTML renderers, picked by file extension.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use pulldown_cmark::{html, Options, Parser};

use crate::adoc::AsciidocRenderer;

/// Errors that can occur while rendering markup.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Unclosed {0} block")]
    UnclosedBlock(&'static str),

    #[error("No renderer for extension: {0}")]
    UnsupportedExtension(String),
}

/// Trait for markup formats.
pub trait MarkupRenderer: Send + Sync {
    /// Format identifier (e.g., "asciidoc", "markdown")
    fn name(&self) -> &'static str;

    /// File extensions this renderer handles
    fn extensions(&self) -> &[&'static str];

    /// Render a document body (front matter already removed) to HTML.
    fn render(&self, source: &str) -> Result<String, RenderError>;
}

/// CommonMark via pulldown-cmark.
#[derive(Debug, Default)]
pub struct MarkdownRenderer;

impl MarkupRenderer for MarkdownRenderer {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn extensions(&self) -> &[&'static str] {
        &["md", "markdown"]
    }

    fn render(&self, source: &str) -> Result<String, RenderError> {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS;

        let parser = Parser::new_ext(source, options);

        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);

        Ok(html_output)
    }
}

/// Renderers by extension.
#[derive(Clone)]
pub struct RendererRegistry {
    renderers: HashMap<&'static str, Arc<dyn MarkupRenderer>>,
}

impl RendererRegistry {
    /// Registry without any renderer.
    pub fn empty() -> Self {
        Self {
            renderers: HashMap::new(),
        }
    }

    /// Registry with the AsciiDoc and Markdown renderers.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(AsciidocRenderer::new()));
        registry.register(Arc::new(MarkdownRenderer));
        registry
    }

    /// Register `renderer` for all of its extensions, replacing earlier ones.
    pub fn register(&mut self, renderer: Arc<dyn MarkupRenderer>) {
        for ext in renderer.extensions() {
            self.renderers.insert(*ext, Arc::clone(&renderer));
        }
    }

    pub fn for_path(&self, path: &Path) -> Option<&dyn MarkupRenderer> {
        let ext = path.extension().and_then(|e| e.to_str())?;
        self.renderers.get(ext).map(|r| r.as_ref())
    }

    pub fn handles(&self, path: &Path) -> bool {
        self.for_path(path).is_some()
    }

    /// Render `source` with the renderer registered for `path`.
    pub fn render(&self, path: &Path, source: &str) -> Result<String, RenderError> {
        let renderer = self.for_path(path).ok_or_else(|| {
            RenderError::UnsupportedExtension(
                path.extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or_default()
                    .to_string(),
            )
        })?;
        renderer.render(source)
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_markdown() {
        let html = MarkdownRenderer.render("# Hello\n\nWorld").unwrap();

        assert!(html.contains("<h1>Hello</h1>"));
        assert!(html.contains("<p>World</p>"));
    }

    #[test]
    fn picks_renderer_by_extension() {
        let registry = RendererRegistry::new();

        assert_eq!(registry.for_path(Path::new("a/b.adoc")).unwrap().name(), "asciidoc");
        assert_eq!(registry.for_path(Path::new("a/b.md")).unwrap().name(), "markdown");
        assert!(!registry.handles(Path::new("a/b.njk")));
        assert!(!registry.handles(Path::new("README")));
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let result = RendererRegistry::new().render(Path::new("x.txt"), "text");

        assert!(matches!(result, Err(RenderError::UnsupportedExtension(ext)) if ext == "txt"));
    }
}

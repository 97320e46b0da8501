//! AsciiDoc rendering for blog posts.
//!
//! Covers the block and inline constructs posts actually use: section
//! titles, paragraphs, listing/literal/passthrough blocks, flat lists,
//! block images, thematic breaks, comments, plus strong, emphasis,
//! monospace and link macros inline. Attribute entries and the document
//! title are consumed here; the page template renders the title itself.

use std::sync::LazyLock;

use regex::Regex;

use fastadoc_meta::slugify;

use crate::markup::{MarkupRenderer, RenderError};

static ATTRIBUTE_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:[^:]+:").expect("valid attribute regex"));
static SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(={1,6})\s+(.+)$").expect("valid section regex"));
static SOURCE_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[source\s*(?:,\s*([\w+#-]+))?[^\]]*\]$").expect("valid source regex")
});
static BLOCK_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^image::([^\[\s]+)\[([^\]]*)\]$").expect("valid image regex")
});
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\*+|-|\.+)\s+(.*)$").expect("valid list regex"));

static MONOSPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("valid monospace regex"));
static STRONG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\n]+)\*").expect("valid strong regex"));
static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b_([^_\n]+)_\b").expect("valid emphasis regex"));
static URL_MACRO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:link:)?((?:https?://|/|\./)[^\s\[<]*)\[([^\]]*)\]").expect("valid link regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            Self::Unordered => "ul",
            Self::Ordered => "ol",
        }
    }
}

/// Renders the AsciiDoc subset described in the module docs.
#[derive(Debug, Default)]
pub struct AsciidocRenderer;

impl AsciidocRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl MarkupRenderer for AsciidocRenderer {
    fn name(&self) -> &'static str {
        "asciidoc"
    }

    fn extensions(&self) -> &[&'static str] {
        &["adoc", "asciidoc", "asc"]
    }

    fn render(&self, source: &str) -> Result<String, RenderError> {
        let mut out = Writer::default();
        let mut lines = source.lines();
        let mut source_lang: Option<String> = None;

        while let Some(raw) = lines.next() {
            let line = raw.trim_end();

            if line.is_empty() {
                out.flush();
                continue;
            }

            if line.starts_with("////") {
                out.flush();
                take_delimited(&mut lines, line, "comment")?;
                continue;
            }

            if line.starts_with("//") || ATTRIBUTE_ENTRY.is_match(line) || line == "toc::[]" {
                out.flush();
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                out.flush();
                source_lang = SOURCE_STYLE
                    .captures(line)
                    .map(|caps| caps.get(1).map_or_else(String::new, |m| m.as_str().to_string()));
                continue;
            }

            if line == "----" {
                out.flush();
                let body = take_delimited(&mut lines, line, "listing")?;
                out.listing(&body, source_lang.take().as_deref());
                continue;
            }

            if line == "...." {
                out.flush();
                let body = take_delimited(&mut lines, line, "literal")?;
                out.listing(&body, None);
                continue;
            }

            if line == "++++" {
                out.flush();
                let body = take_delimited(&mut lines, line, "passthrough")?;
                out.raw(&body);
                continue;
            }

            if line == "'''" {
                out.flush();
                out.raw("<hr>");
                continue;
            }

            if let Some(caps) = SECTION.captures(line) {
                out.flush();
                let level = caps[1].len();
                if level > 1 {
                    out.heading(level, caps[2].trim());
                }
                continue;
            }

            if let Some(caps) = BLOCK_IMAGE.captures(line) {
                out.flush();
                out.image(&caps[1], &caps[2]);
                continue;
            }

            if let Some(caps) = LIST_ITEM.captures(line) {
                let kind = if caps[1].starts_with('.') {
                    ListKind::Ordered
                } else {
                    ListKind::Unordered
                };
                out.list_item(kind, &caps[2]);
                continue;
            }

            source_lang = None;
            out.paragraph_line(line);
        }

        out.flush();
        Ok(out.html)
    }
}

/// Collect lines up to the closing `delimiter`.
fn take_delimited<'a>(
    lines: &mut impl Iterator<Item = &'a str>,
    delimiter: &str,
    kind: &'static str,
) -> Result<String, RenderError> {
    let mut body = Vec::new();
    for line in lines.by_ref() {
        if line.trim_end() == delimiter {
            return Ok(body.join("\n"));
        }
        body.push(line);
    }
    Err(RenderError::UnclosedBlock(kind))
}

#[derive(Default)]
struct Writer {
    html: String,
    paragraph: Vec<String>,
    list: Option<ListKind>,
}

impl Writer {
    /// Close any open paragraph or list.
    fn flush(&mut self) {
        if !self.paragraph.is_empty() {
            let text = self.paragraph.join(" ");
            self.paragraph.clear();
            self.html.push_str("<p>");
            self.html.push_str(&inline(&text));
            self.html.push_str("</p>\n");
        }
        if let Some(kind) = self.list.take() {
            self.html.push_str(&format!("</{}>\n", kind.tag()));
        }
    }

    fn paragraph_line(&mut self, line: &str) {
        if self.list.is_some() {
            self.flush();
        }
        self.paragraph.push(line.trim().to_string());
    }

    fn list_item(&mut self, kind: ListKind, text: &str) {
        if self.list != Some(kind) {
            self.flush();
            self.html.push_str(&format!("<{}>\n", kind.tag()));
            self.list = Some(kind);
        }
        self.html.push_str("<li>");
        self.html.push_str(&inline(text));
        self.html.push_str("</li>\n");
    }

    fn heading(&mut self, level: usize, title: &str) {
        self.html.push_str(&format!(
            "<h{level} id=\"{}\">{}</h{level}>\n",
            slugify(title),
            inline(title)
        ));
    }

    fn listing(&mut self, body: &str, lang: Option<&str>) {
        let code = html_escape::encode_text(body);
        match lang.filter(|l| !l.is_empty()) {
            Some(lang) => {
                let lang = html_escape::encode_double_quoted_attribute(lang);
                self.html.push_str(&format!(
                    "<pre class=\"highlight\"><code class=\"language-{lang}\" data-lang=\"{lang}\">{code}</code></pre>\n"
                ));
            }
            None => self
                .html
                .push_str(&format!("<pre class=\"highlight\"><code>{code}</code></pre>\n")),
        }
    }

    fn image(&mut self, target: &str, alt: &str) {
        self.html.push_str(&format!(
            "<div class=\"imageblock\"><img src=\"{}\" alt=\"{}\"></div>\n",
            html_escape::encode_double_quoted_attribute(target),
            html_escape::encode_double_quoted_attribute(alt)
        ));
    }

    fn raw(&mut self, html: &str) {
        self.html.push_str(html);
        self.html.push('\n');
    }
}

/// Escape text and apply inline formatting.
fn inline(text: &str) -> String {
    let escaped = html_escape::encode_text(text);
    let linked = URL_MACRO.replace_all(&escaped, |caps: &regex::Captures| {
        let label = if caps[2].is_empty() { &caps[1] } else { &caps[2] };
        format!("<a href=\"{}\">{}</a>", &caps[1], label)
    });
    let code = MONOSPACE.replace_all(&linked, "<code>$1</code>");
    let strong = STRONG.replace_all(&code, "<strong>$1</strong>");
    EMPHASIS.replace_all(&strong, "<em>$1</em>").into_owned()
}

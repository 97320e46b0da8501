//! Stylesheet generation.

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Generate the main CSS file: one palette per `data-theme` plus the layout rules.
    pub fn generate_css() -> String {
        let mut css = String::new();

        for (theme, palette) in PALETTES {
            let selector = if *theme == DEFAULT_PALETTE {
                format!(":root, [data-theme=\"{}\"]", theme)
            } else {
                format!("[data-theme=\"{}\"]", theme)
            };
            css.push_str(&format!(
                "{} {{\n  --background: {};\n  --foreground: {};\n  --muted: {};\n  --border: {};\n  --primary: {};\n}}\n\n",
                selector, palette.background, palette.foreground, palette.muted, palette.border, palette.primary
            ));
        }

        css.push_str(LAYOUT_CSS);
        css
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }
}

struct Palette {
    background: &'static str,
    foreground: &'static str,
    muted: &'static str,
    border: &'static str,
    primary: &'static str,
}

const fn palette(
    background: &'static str,
    foreground: &'static str,
    muted: &'static str,
    border: &'static str,
    primary: &'static str,
) -> Palette {
    Palette {
        background,
        foreground,
        muted,
        border,
        primary,
    }
}

/// Palette applied when the page carries no known theme.
const DEFAULT_PALETTE: &str = "moonstomp";

const PALETTES: &[(&str, Palette)] = &[
    ("moonstomp", palette("#fdfcf8", "#1f2328", "#f3f1ea", "#d8d4c8", "#7a3e9d")),
    ("light", palette("#ffffff", "#1f2328", "#f6f8fa", "#d0d7de", "#0969da")),
    ("light_high_contrast", palette("#ffffff", "#0e1116", "#e7ecf0", "#20252c", "#0349b4")),
    ("light_tritanopia", palette("#ffffff", "#1f2328", "#f6f8fa", "#d0d7de", "#0969da")),
    ("preferred_color_scheme", palette("#ffffff", "#1f2328", "#f6f8fa", "#d0d7de", "#0969da")),
    ("dark", palette("#0d1117", "#e6edf3", "#161b22", "#30363d", "#2f81f7")),
    ("dark_dimmed", palette("#22272e", "#adbac7", "#2d333b", "#444c56", "#539bf5")),
    ("dark_high_contrast", palette("#0a0c10", "#f0f3f6", "#272b33", "#7a828e", "#71b7ff")),
    ("dark_tritanopia", palette("#0d1117", "#e6edf3", "#161b22", "#30363d", "#2f81f7")),
    ("transparent_dark", palette("#0d1117", "#e6edf3", "#161b22", "#30363d", "#2f81f7")),
    ("noborder_dark", palette("#0d1117", "#e6edf3", "#161b22", "#161b22", "#2f81f7")),
    ("dark_no_border", palette("#0d1117", "#e6edf3", "#161b22", "#161b22", "#2f81f7")),
    ("nolanlawson", palette("#fafafa", "#222222", "#eeeeee", "#cccccc", "#c0392b")),
];

const LAYOUT_CSS: &str = r#"@media (prefers-color-scheme: dark) {
  [data-theme="preferred_color_scheme"] {
    --background: #0d1117;
    --foreground: #e6edf3;
    --muted: #161b22;
    --border: #30363d;
    --primary: #2f81f7;
  }
}

* {
  box-sizing: border-box;
}

body {
  margin: 0;
  font-family: system-ui, -apple-system, sans-serif;
  background: var(--background);
  color: var(--foreground);
  line-height: 1.6;
}

a {
  color: var(--primary);
}

.site-header {
  display: flex;
  justify-content: space-between;
  align-items: center;
  padding: 1rem 1.5rem;
  border-bottom: 1px solid var(--border);
}

.site-title {
  font-weight: 700;
  text-decoration: none;
  color: var(--foreground);
}

.site-nav a {
  margin-left: 1rem;
  text-decoration: none;
}

.main {
  max-width: 760px;
  margin: 0 auto;
  padding: 2rem 1.5rem;
}

.post-meta {
  color: var(--foreground);
  opacity: 0.7;
  font-size: 0.9rem;
}

.hero {
  width: 100%;
  border-radius: 8px;
}

.tag-list {
  display: flex;
  flex-wrap: wrap;
  gap: 0.5rem;
  padding: 0;
  list-style: none;
}

.tag-list a {
  padding: 0.1rem 0.6rem;
  border: 1px solid var(--border);
  border-radius: 999px;
  text-decoration: none;
}

.post-list {
  padding: 0;
  list-style: none;
}

.post-list li {
  margin-bottom: 1.5rem;
}

pre.highlight {
  background: var(--muted);
  border: 1px solid var(--border);
  border-radius: 6px;
  padding: 1rem;
  overflow-x: auto;
}

.imageblock img {
  max-width: 100%;
}

.comments {
  margin-top: 3rem;
  padding-top: 1.5rem;
  border-top: 1px solid var(--border);
}
"#;

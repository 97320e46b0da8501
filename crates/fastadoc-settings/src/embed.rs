//! Comments embed markup, shared by the settings preview and post pages.

use serde::Serialize;

use crate::site::{CommentsProvider, SiteConfig};

const GISCUS_CLIENT: &str = "https://giscus.app/client.js";
const WALINE_CSS: &str = "https://unpkg.com/@waline/client@v3/dist/waline.css";
const WALINE_JS: &str = "https://unpkg.com/@waline/client@v3/dist/waline.js";
const PLACEHOLDER: &str = "<em>No provider selected.</em>";

/// Attributes of a giscus client script.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GiscusEmbed {
    pub repo: String,
    pub repo_id: Option<String>,
    pub category: Option<String>,
    pub category_id: Option<String>,
    pub mapping: String,
    pub theme: String,
    pub lang: String,
}

/// What the comments area shows for a given configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommentsEmbed {
    /// Provider off, or its required fields are blank
    Placeholder,
    Giscus(GiscusEmbed),
    Waline { server_url: String },
}

impl CommentsEmbed {
    /// Build the embed for `config` from its current values only.
    ///
    /// Giscus needs a repository and Waline a server URL; without them the
    /// placeholder is used instead of a half-configured embed.
    pub fn from_config(config: &SiteConfig) -> Self {
        match config.comments_provider {
            CommentsProvider::Giscus if !config.giscus.repo.trim().is_empty() => {
                let giscus = &config.giscus;
                Self::Giscus(GiscusEmbed {
                    repo: giscus.repo.clone(),
                    repo_id: non_empty(&giscus.repo_id),
                    category: non_empty(&giscus.category),
                    category_id: non_empty(&giscus.category_id),
                    mapping: non_empty(&giscus.mapping).unwrap_or_else(|| "pathname".to_string()),
                    theme: non_empty(&config.theme)
                        .or_else(|| non_empty(&giscus.theme))
                        .unwrap_or_else(|| "light".to_string()),
                    lang: non_empty(&giscus.lang).unwrap_or_else(|| "en".to_string()),
                })
            }
            CommentsProvider::Waline if !config.waline.server_url.trim().is_empty() => Self::Waline {
                server_url: config.waline.server_url.trim().to_string(),
            },
            _ => Self::Placeholder,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }

    /// HTML for the comments area.
    pub fn to_html(&self) -> String {
        match self {
            Self::Placeholder => PLACEHOLDER.to_string(),
            Self::Giscus(giscus) => giscus_html(giscus),
            Self::Waline { server_url } => waline_html(server_url),
        }
    }

    /// HTML for a published page: nothing at all instead of the placeholder.
    pub fn page_html(&self) -> Option<String> {
        (!self.is_placeholder()).then(|| self.to_html())
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn attr(name: &str, value: &str) -> String {
    format!(
        " {}=\"{}\"",
        name,
        html_escape::encode_double_quoted_attribute(value)
    )
}

fn giscus_html(giscus: &GiscusEmbed) -> String {
    let mut html = format!("<script{}", attr("src", GISCUS_CLIENT));
    html.push_str(&attr("data-repo", &giscus.repo));
    for (name, value) in [
        ("data-repo-id", &giscus.repo_id),
        ("data-category", &giscus.category),
        ("data-category-id", &giscus.category_id),
    ] {
        if let Some(value) = value {
            html.push_str(&attr(name, value));
        }
    }
    html.push_str(&attr("data-mapping", &giscus.mapping));
    html.push_str(&attr("data-input-position", "bottom"));
    html.push_str(&attr("data-reactions-enabled", "1"));
    html.push_str(&attr("data-theme", &giscus.theme));
    html.push_str(&attr("data-lang", &giscus.lang));
    html.push_str(" crossorigin=\"anonymous\" async></script>");
    html
}

fn waline_html(server_url: &str) -> String {
    // JSON string literal, with `<` escaped so the value cannot close the script
    let server_url = serde_json::Value::from(server_url)
        .to_string()
        .replace('<', "\\u003c");

    format!(
        r#"<div id="waline"></div>
<link rel="stylesheet" href="{WALINE_CSS}">
<script type="module">
  import {{ init }} from '{WALINE_JS}';
  init({{ el: '#waline', serverURL: {server_url}, login: 'force', reaction: true, pageview: true }});
</script>"#
    )
}

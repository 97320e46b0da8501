//! Reading identifiers out of a pasted giscus embed snippet.

use std::collections::HashMap;

use crate::error::SnippetError;
use crate::site::GiscusSettings;

const CLIENT_SCRIPT: &str = "giscus.app/client.js";

/// Attributes of the giscus `<script>` tag found in a pasted snippet.
#[derive(Debug, Clone, PartialEq)]
pub struct GiscusSnippet {
    attributes: HashMap<String, String>,
}

impl GiscusSnippet {
    /// Find the first script tag loading the giscus client in `text`.
    pub fn parse(text: &str) -> Result<Self, SnippetError> {
        let dom = tl::parse(text, tl::ParserOptions::default()).map_err(|e| {
            tracing::debug!("Pasted snippet is not parseable HTML: {:?}", e);
            SnippetError::NoScript
        })?;

        dom.nodes()
            .iter()
            .filter_map(tl::Node::as_tag)
            .filter(|tag| tag.name().as_utf8_str().eq_ignore_ascii_case("script"))
            .map(script_attributes)
            .find(|attrs| {
                attrs
                    .get("src")
                    .is_some_and(|src| src.contains(CLIENT_SCRIPT))
            })
            .map(|attributes| Self { attributes })
            .ok_or(SnippetError::NoScript)
    }

    /// Value of `data-<key>`, empty when the snippet does not set it.
    pub fn data(&self, key: &str) -> &str {
        self.attributes
            .get(&format!("data-{}", key))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Write the snippet's identifiers into `settings`.
    ///
    /// Repository and category identifiers are always replaced, with an
    /// empty string when the snippet omits them. Mapping, theme and
    /// language only change when the snippet sets them.
    pub fn apply_to(&self, settings: &mut GiscusSettings) {
        settings.repo = self.data("repo").to_string();
        settings.repo_id = self.data("repo-id").to_string();
        settings.category = self.data("category").to_string();
        settings.category_id = self.data("category-id").to_string();

        for (key, slot) in [
            ("mapping", &mut settings.mapping),
            ("theme", &mut settings.theme),
            ("lang", &mut settings.lang),
        ] {
            let value = self.data(key);
            if !value.is_empty() {
                *slot = value.to_string();
            }
        }
    }
}

fn script_attributes(tag: &tl::HTMLTag) -> HashMap<String, String> {
    tag.attributes()
        .iter()
        .map(|(key, value)| {
            let value = value.unwrap_or_default();
            (
                key.to_ascii_lowercase(),
                html_escape::decode_html_entities(&value).into_owned(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SNIPPET: &str = r#"<script src="https://giscus.app/client.js"
        data-repo="jane/blog"
        data-repo-id="R_kgDOabc"
        data-category="Announcements"
        data-category-id="DIC_kwDOxyz"
        data-mapping="title"
        data-strict="0"
        data-theme="dark_dimmed"
        data-lang="de"
        crossorigin="anonymous"
        async>
</script>"#;

    #[test]
    fn extracts_all_identifiers() {
        let mut settings = GiscusSettings::default();

        GiscusSnippet::parse(SNIPPET).unwrap().apply_to(&mut settings);

        assert_eq!(
            settings,
            GiscusSettings {
                repo: "jane/blog".to_string(),
                repo_id: "R_kgDOabc".to_string(),
                category: "Announcements".to_string(),
                category_id: "DIC_kwDOxyz".to_string(),
                mapping: "title".to_string(),
                theme: "dark_dimmed".to_string(),
                lang: "de".to_string(),
            }
        );
    }

    #[test]
    fn omitted_category_id_is_cleared() {
        let mut settings = GiscusSettings {
            repo: "old/repo".to_string(),
            category_id: "OLD".to_string(),
            ..Default::default()
        };

        GiscusSnippet::parse(
            r#"<script src="https://giscus.app/client.js" data-repo="new/repo" async></script>"#,
        )
        .unwrap()
        .apply_to(&mut settings);

        assert_eq!(settings.repo, "new/repo");
        assert_eq!(settings.category_id, "");
        assert_eq!(settings.mapping, "pathname");
    }

    #[test]
    fn skips_unrelated_scripts() {
        let text = r#"<script src="/other.js" data-repo="wrong"></script>
<script data-repo='right' src='https://giscus.app/client.js'></script>"#;

        let snippet = GiscusSnippet::parse(text).unwrap();

        assert_eq!(snippet.data("repo"), "right");
    }

    #[test]
    fn quoted_angle_brackets_stay_inside_values() {
        let snippet = GiscusSnippet::parse(
            r#"<script data-category="a > b" src="https://giscus.app/client.js" data-repo="jane/blog"></script>"#,
        )
        .unwrap();

        assert_eq!(snippet.data("category"), "a > b");
        assert_eq!(snippet.data("repo"), "jane/blog");
    }

    #[test]
    fn decodes_entities() {
        let snippet = GiscusSnippet::parse(
            r#"<script src="https://giscus.app/client.js" data-category="Q&amp;A"></script>"#,
        )
        .unwrap();

        assert_eq!(snippet.data("category"), "Q&A");
    }

    #[test]
    fn rejects_text_without_client_script() {
        assert_eq!(
            GiscusSnippet::parse("<div data-repo=\"x\"></div>"),
            Err(SnippetError::NoScript)
        );
    }
}

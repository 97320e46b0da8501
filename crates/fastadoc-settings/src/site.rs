//! The `config.json` record.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SettingsError;
use crate::themes::{SESSION_DEFAULT_THEME, SITE_DEFAULT_THEME};

/// Comments integration embedded under posts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentsProvider {
    #[default]
    Off,
    Giscus,
    Waline,
}

impl CommentsProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Giscus => "giscus",
            Self::Waline => "waline",
        }
    }

    /// Parse the wire name (`off`, `giscus`, `waline`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "off" => Some(Self::Off),
            "giscus" => Some(Self::Giscus),
            "waline" => Some(Self::Waline),
            _ => None,
        }
    }
}

/// Settings for the GitHub Discussions backed provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GiscusSettings {
    /// `owner/name` of the discussions repository
    pub repo: String,
    pub repo_id: String,
    pub category: String,
    pub category_id: String,
    /// How pages map to discussions (`pathname`, `url`, `title`, ...)
    pub mapping: String,
    pub theme: String,
    pub lang: String,
}

impl Default for GiscusSettings {
    fn default() -> Self {
        Self {
            repo: String::new(),
            repo_id: String::new(),
            category: String::new(),
            category_id: String::new(),
            mapping: "pathname".to_string(),
            theme: "light".to_string(),
            lang: "en".to_string(),
        }
    }
}

/// Settings for the self-hosted provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalineSettings {
    #[serde(rename = "serverURL")]
    pub server_url: String,
}

/// Author profile looked up by the key used in a page's `author` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Site-wide configuration persisted as `config.json`.
///
/// Missing keys take their defaults, nested ones included. Keys this type
/// does not know are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
    pub theme: String,
    pub comments_provider: CommentsProvider,
    pub giscus: GiscusSettings,
    pub waline: WalineSettings,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub authors: BTreeMap<String, Author>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            theme: SITE_DEFAULT_THEME.to_string(),
            comments_provider: CommentsProvider::Off,
            giscus: GiscusSettings::default(),
            waline: WalineSettings::default(),
            authors: BTreeMap::new(),
            extra: Map::new(),
        }
    }
}

/// Outcome of [`SiteConfig::load`].
///
/// A build always gets a usable configuration; `Fallback` says why it is
/// the built-in default rather than the file's content.
#[derive(Debug)]
pub enum Loaded {
    Read(SiteConfig),
    Fallback(SiteConfig, SettingsError),
}

impl Loaded {
    pub fn config(&self) -> &SiteConfig {
        match self {
            Self::Read(config) | Self::Fallback(config, _) => config,
        }
    }

    pub fn into_config(self) -> SiteConfig {
        match self {
            Self::Read(config) | Self::Fallback(config, _) => config,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(..))
    }
}

impl SiteConfig {
    /// Default used when a settings session could not fetch anything.
    pub fn session_default() -> Self {
        Self {
            theme: SESSION_DEFAULT_THEME.to_string(),
            ..Self::default()
        }
    }

    /// Parse configuration JSON, filling defaults for everything omitted.
    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        let mut config: Self = serde_json::from_str(text)?;
        if config.theme.trim().is_empty() {
            config.theme = SITE_DEFAULT_THEME.to_string();
        }
        Ok(config)
    }

    /// Read `path`, substituting the default on any read or parse failure.
    pub fn load(path: &Path) -> Loaded {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(source) => {
                return Loaded::Fallback(
                    Self::default(),
                    SettingsError::Read {
                        path: path.to_path_buf(),
                        source,
                    },
                )
            }
        };

        match Self::from_json(&text) {
            Ok(config) => Loaded::Read(config),
            Err(e) => Loaded::Fallback(Self::default(), e),
        }
    }

    /// Pretty-printed JSON with a trailing newline, as stored on disk.
    pub fn to_pretty_json(&self) -> Result<String, SettingsError> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Overwrite `path` with this configuration. Last write wins.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = self.to_pretty_json()?;
        fs::write(path, json).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn partial_config_fills_nested_defaults() {
        let config = SiteConfig::from_json(r#"{"commentsProvider":"waline"}"#).unwrap();

        assert_eq!(config.comments_provider, CommentsProvider::Waline);
        assert_eq!(config.theme, SITE_DEFAULT_THEME);
        assert_eq!(config.giscus, GiscusSettings::default());
        assert_eq!(config.waline.server_url, "");
    }

    #[test]
    fn partial_nested_object_keeps_other_defaults() {
        let config = SiteConfig::from_json(r#"{"giscus":{"repo":"me/blog"}}"#).unwrap();

        assert_eq!(config.giscus.repo, "me/blog");
        assert_eq!(config.giscus.mapping, "pathname");
        assert_eq!(config.giscus.lang, "en");
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let temp = tempdir().unwrap();

        let loaded = SiteConfig::load(&temp.path().join("config.json"));

        assert!(loaded.is_fallback());
        assert_eq!(loaded.config().comments_provider, CommentsProvider::Off);
        assert_eq!(loaded.config().theme, SITE_DEFAULT_THEME);
    }

    #[test]
    fn malformed_file_falls_back_to_default() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let loaded = SiteConfig::load(&path);

        assert!(matches!(loaded, Loaded::Fallback(_, SettingsError::Parse(_))));
        assert_eq!(loaded.into_config(), SiteConfig::default());
    }

    #[test]
    fn writes_wire_names_and_trailing_newline() {
        let mut config = SiteConfig::default();
        config.comments_provider = CommentsProvider::Giscus;
        config.giscus.repo_id = "R_1".to_string();
        config.waline.server_url = "https://w.example".to_string();

        let json = config.to_pretty_json().unwrap();

        assert!(json.ends_with("}\n"));
        assert!(json.contains("\"commentsProvider\": \"giscus\""));
        assert!(json.contains("\"repoId\": \"R_1\""));
        assert!(json.contains("\"serverURL\": \"https://w.example\""));
        assert!(!json.contains("authors"));
    }

    #[test]
    fn preserves_unknown_keys_on_save() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{"theme":"dark","analytics":{"id":"x"}}"#).unwrap();

        let config = SiteConfig::load(&path).into_config();
        config.save(&path).unwrap();
        let reread: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(reread["analytics"]["id"], "x");
        assert_eq!(reread["theme"], "dark");
    }

    #[test]
    fn reads_authors() {
        let config =
            SiteConfig::from_json(r#"{"authors":{"jane":{"name":"Jane Doe","url":"https://j.example"}}}"#)
                .unwrap();

        assert_eq!(config.authors["jane"].name.as_deref(), Some("Jane Doe"));
        assert_eq!(config.authors["jane"].avatar, None);
    }
}

//! The `fastadoc.toml` tool configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fastadoc_static::{BuildConfig, BuildMode};
use serde::Deserialize;

/// Configuration file structure (fastadoc.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub site: SiteSection,
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub build: BuildSection,
}

#[derive(Debug, Deserialize)]
pub struct SiteSection {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: default_title(),
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PathsSection {
    #[serde(default = "default_input")]
    pub input: PathBuf,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_public")]
    pub public: PathBuf,
    /// The site's `config.json`
    #[serde(default = "default_site_config")]
    pub config: PathBuf,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            public: default_public(),
            config: default_site_config(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BuildSection {
    #[serde(default = "default_minify")]
    pub minify: bool,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            minify: default_minify(),
        }
    }
}

fn default_title() -> String {
    "Blog".to_string()
}
fn default_base_url() -> String {
    "/".to_string()
}
fn default_input() -> PathBuf {
    PathBuf::from("src")
}
fn default_output() -> PathBuf {
    PathBuf::from("_site")
}
fn default_public() -> PathBuf {
    PathBuf::from("public")
}
fn default_site_config() -> PathBuf {
    PathBuf::from("config.json")
}
fn default_minify() -> bool {
    true
}

impl ConfigFile {
    /// Load configuration from `path` if it exists.
    /// Returns an error if the file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn build_config(&self, mode: BuildMode) -> BuildConfig {
        BuildConfig {
            input_dir: self.paths.input.clone(),
            output_dir: self.paths.output.clone(),
            public_dir: self.paths.public.clone(),
            config_path: self.paths.config.clone(),
            base_url: self.site.base_url.clone(),
            title: self.site.title.clone(),
            minify: self.build.minify,
            mode,
        }
    }
}

//! Where a settings session reads and persists the configuration.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SettingsError;
use crate::site::SiteConfig;

/// Key the local preview store keeps the draft under.
pub const LOCAL_STORE_KEY: &str = "asciBlogConfig";

/// System of record for the configuration.
#[async_trait]
pub trait ConfigBackend: Send + Sync {
    /// Fetch the currently persisted configuration as raw JSON.
    async fn fetch(&self) -> Result<Value, SettingsError>;

    /// Persist `config`, replacing whatever is stored.
    async fn submit(&self, config: &SiteConfig) -> Result<(), SettingsError>;
}

/// Reads and writes the configuration file directly.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConfigBackend for FileBackend {
    async fn fetch(&self) -> Result<Value, SettingsError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SettingsError::Read {
                path: self.path.clone(),
                source,
            })?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn submit(&self, config: &SiteConfig) -> Result<(), SettingsError> {
        let json = config.to_pretty_json()?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|source| SettingsError::Write {
                path: self.path.clone(),
                source,
            })
    }
}

/// Talks to a server exposing `GET /config.json` and `POST /api/save-config`.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a backend for the server at `base_url` (e.g. `http://127.0.0.1:8080`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ConfigBackend for HttpBackend {
    async fn fetch(&self) -> Result<Value, SettingsError> {
        let url = self.url("/config.json");
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SettingsError::Status {
                url,
                status: response.status().as_u16(),
            });
        }

        Ok(response.json().await?)
    }

    async fn submit(&self, config: &SiteConfig) -> Result<(), SettingsError> {
        let url = self.url("/api/save-config");
        let response = self.client.post(&url).json(config).send().await?;

        if !response.status().is_success() {
            return Err(SettingsError::Status {
                url,
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }
}

/// Ephemeral, advisory store for previewing a draft. Never the system of record.
pub trait LocalStore: Send + Sync {
    fn set(&mut self, key: &str, value: String);
    fn get(&self, key: &str) -> Option<String>;
}

/// Store that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

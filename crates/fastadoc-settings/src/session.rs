//! Single-user settings editing session.
//!
//! The session owns one draft [`SiteConfig`]. Every mutation rebuilds the
//! applied theme and the comments preview from the draft. Persisting goes
//! either to the local preview store or to the configured backend; neither
//! path retries, and a failed remote save leaves the draft untouched.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::backend::{ConfigBackend, LocalStore, LOCAL_STORE_KEY};
use crate::embed::CommentsEmbed;
use crate::error::{SettingsError, SnippetError};
use crate::site::{CommentsProvider, SiteConfig};
use crate::snippet::GiscusSnippet;
use crate::themes::{is_known_theme, SESSION_DEFAULT_THEME, THEMES};

const SAVED_LOCALLY: &str = "Saved locally (preview mode). Use Save to repo to persist.";
const SAVED_REMOTE: &str = "Saved to repo (site will use it on next build)";
const SAVE_FAILED: &str = "Failed to save (check token)";

/// One entry of the theme picker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeOption {
    pub id: &'static str,
    pub selected: bool,
}

/// What the settings form shows for the current draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormView {
    pub themes: Vec<ThemeOption>,
    pub theme: String,
    pub provider: &'static str,
    pub giscus_visible: bool,
    pub waline_visible: bool,
    pub waline_server_url: String,
    pub status: Option<String>,
}

/// An editing session over a draft configuration.
pub struct SettingsSession {
    draft: SiteConfig,
    applied_theme: String,
    preview: CommentsEmbed,
    status: Option<String>,
    backend: Arc<dyn ConfigBackend>,
    local: Box<dyn LocalStore>,
}

/// A remote save detached from its session.
///
/// Holds a snapshot of the draft and the backend, so the submission can be
/// awaited without borrowing the session. Feed the outcome back with
/// [`SettingsSession::record_remote_result`].
pub struct PendingSave {
    draft: SiteConfig,
    backend: Arc<dyn ConfigBackend>,
}

impl PendingSave {
    pub fn draft(&self) -> &SiteConfig {
        &self.draft
    }

    pub async fn submit(self) -> Result<(), SettingsError> {
        self.backend.submit(&self.draft).await
    }
}

impl SettingsSession {
    /// Start a session from whatever `backend` currently holds.
    ///
    /// Any fetch or parse failure starts from the built-in default instead.
    pub async fn load(backend: Box<dyn ConfigBackend>, local: Box<dyn LocalStore>) -> Self {
        let draft = match backend.fetch().await {
            Ok(value) => draft_from(value),
            Err(e) => {
                tracing::warn!("Using default settings, could not load config: {}", e);
                SiteConfig::session_default()
            }
        };

        Self::with_draft(draft, backend, local)
    }

    /// Start a session from an already known draft.
    pub fn with_draft(
        draft: SiteConfig,
        backend: Box<dyn ConfigBackend>,
        local: Box<dyn LocalStore>,
    ) -> Self {
        let mut session = Self {
            applied_theme: draft.theme.clone(),
            preview: CommentsEmbed::Placeholder,
            draft,
            status: None,
            backend: Arc::from(backend),
            local,
        };
        session.refresh();
        session
    }

    pub fn draft(&self) -> &SiteConfig {
        &self.draft
    }

    /// Theme currently applied to the page (`data-theme`).
    pub fn applied_theme(&self) -> &str {
        &self.applied_theme
    }

    pub fn preview(&self) -> &CommentsEmbed {
        &self.preview
    }

    /// Outcome of the last save, for display.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Pick a theme from the library and apply it at once.
    pub fn select_theme(&mut self, theme: &str) -> Result<(), SettingsError> {
        if !is_known_theme(theme) {
            return Err(SettingsError::UnknownTheme(theme.to_string()));
        }
        self.draft.theme = theme.to_string();
        self.refresh();
        Ok(())
    }

    /// Switch the comments provider; this also switches which fields are editable.
    pub fn select_provider(&mut self, provider: CommentsProvider) {
        self.draft.comments_provider = provider;
        self.refresh();
    }

    /// Take the giscus identifiers from a pasted embed snippet.
    ///
    /// The last pasted snippet wins. Text without a giscus script leaves the
    /// draft as it was.
    pub fn paste_giscus_snippet(&mut self, text: &str) -> Result<(), SnippetError> {
        let snippet = GiscusSnippet::parse(text)?;
        snippet.apply_to(&mut self.draft.giscus);
        self.refresh();
        Ok(())
    }

    pub fn set_waline_server(&mut self, url: &str) {
        self.draft.waline.server_url = url.trim().to_string();
        self.refresh();
    }

    /// Write the draft to the local preview store.
    pub fn save_local(&mut self) -> Result<(), SettingsError> {
        let json = serde_json::to_string(&self.draft)?;
        self.local.set(LOCAL_STORE_KEY, json);
        self.status = Some(SAVED_LOCALLY.to_string());
        Ok(())
    }

    /// Draft last written to the local preview store, if any.
    pub fn local_copy(&self) -> Option<SiteConfig> {
        self.local
            .get(LOCAL_STORE_KEY)
            .and_then(|json| serde_json::from_str(&json).ok())
    }

    /// Submit the draft to the backend.
    ///
    /// No retry and no concurrency check: a concurrent edit elsewhere is
    /// overwritten.
    pub async fn save_remote(&mut self) -> Result<(), SettingsError> {
        let result = self.begin_remote_save().submit().await;
        self.record_remote_result(result)
    }

    /// Snapshot the draft for a submission made outside the session.
    pub fn begin_remote_save(&self) -> PendingSave {
        PendingSave {
            draft: self.draft.clone(),
            backend: Arc::clone(&self.backend),
        }
    }

    /// Report the outcome of a submission. The last recorded outcome is the
    /// status shown.
    pub fn record_remote_result(
        &mut self,
        result: Result<(), SettingsError>,
    ) -> Result<(), SettingsError> {
        match result {
            Ok(()) => {
                self.status = Some(SAVED_REMOTE.to_string());
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Saving settings failed: {}", e);
                self.status = Some(SAVE_FAILED.to_string());
                Err(e)
            }
        }
    }

    /// Form state derived from the draft.
    pub fn form(&self) -> FormView {
        let provider = self.draft.comments_provider;
        FormView {
            themes: THEMES
                .iter()
                .map(|&id| ThemeOption {
                    id,
                    selected: id == self.draft.theme,
                })
                .collect(),
            theme: self.draft.theme.clone(),
            provider: provider.as_str(),
            giscus_visible: provider == CommentsProvider::Giscus,
            waline_visible: provider == CommentsProvider::Waline,
            waline_server_url: self.draft.waline.server_url.clone(),
            status: self.status.clone(),
        }
    }

    fn refresh(&mut self) {
        if !self.draft.theme.is_empty() {
            self.applied_theme = self.draft.theme.clone();
        }
        self.preview = CommentsEmbed::from_config(&self.draft);
    }
}

/// Overlay fetched JSON on the defaults.
///
/// The theme comes from the top-level field, then the provider's theme,
/// then the default.
fn draft_from(value: Value) -> SiteConfig {
    let theme = value
        .get("theme")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .or_else(|| {
            value
                .pointer("/giscus/theme")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
        })
        .unwrap_or(SESSION_DEFAULT_THEME)
        .to_string();

    let mut draft = match serde_json::from_value::<SiteConfig>(value) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Using default settings, config did not parse: {}", e);
            SiteConfig::session_default()
        }
    };
    draft.theme = theme;
    draft
}

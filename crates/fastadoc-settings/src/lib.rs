//! Site configuration for fastadoc blogs.
//!
//! Holds the `config.json` record (theme and comments provider), its
//! load-with-fallback and persistence rules, and the single-user settings
//! session that edits a draft of it.

pub mod backend;
pub mod embed;
pub mod error;
pub mod session;
pub mod site;
pub mod snippet;
pub mod themes;

pub use backend::{ConfigBackend, FileBackend, HttpBackend, LocalStore, MemoryStore, LOCAL_STORE_KEY};
pub use embed::{CommentsEmbed, GiscusEmbed};
pub use error::{SettingsError, SnippetError};
pub use session::{FormView, PendingSave, SettingsSession, ThemeOption};
pub use site::{Author, CommentsProvider, GiscusSettings, Loaded, SiteConfig, WalineSettings};
pub use snippet::GiscusSnippet;
pub use themes::{is_known_theme, SESSION_DEFAULT_THEME, SITE_DEFAULT_THEME, THEMES};

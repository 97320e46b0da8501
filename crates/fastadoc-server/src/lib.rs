//! Development and hosting server for fastadoc blogs.
//!
//! The development server rebuilds the site on change and pushes a reload
//! over a WebSocket. It also serves the settings page and the two
//! `config.json` endpoints, all restricted to loopback clients. The hosted
//! endpoint commits configuration to a GitHub repository instead.

pub mod config_api;
pub mod hosted;
pub mod server;
pub mod setup;
pub mod watcher;
pub mod websocket;

pub use config_api::require_loopback;
pub use hosted::{HostedConfig, HostedError, RepoClient};
pub use server::{app, DevServer, DevServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
pub use websocket::{ReloadHub, ReloadMessage};

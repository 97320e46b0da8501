//! Development server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    middleware,
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::sync::RwLock;
use tower_http::{services::ServeDir, trace::TraceLayer};

use fastadoc_settings::{ConfigBackend, FileBackend, HttpBackend, MemoryStore, SettingsSession};
use fastadoc_static::{BuildConfig, BuildMode, BuildResult, StaticBuilder};

use crate::config_api::{self, require_loopback};
use crate::setup::{self, SETUP_PATH};
use crate::watcher::FileWatcher;
use crate::websocket::{reload_client_script, ReloadHub, ReloadMessage, RELOAD_SCRIPT_PATH, RELOAD_SOCKET_PATH};

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Site build; always run in development mode
    pub build: BuildConfig,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,

    /// Server the settings page saves through instead of the local file
    pub save_endpoint: Option<String>,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            build: BuildConfig {
                mode: BuildMode::Development,
                ..Default::default()
            },
            port: 8080,
            host: "127.0.0.1".to_string(),
            open: true,
            save_endpoint: None,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address {0}")]
    AddressError(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error("Build failed: {0}")]
    BuildError(String),
}

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    /// Create a new development server.
    pub fn new(mut config: DevServerConfig) -> Self {
        config.build.mode = BuildMode::Development;
        Self { config }
    }

    /// Start the development server.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|_| {
                ServerError::AddressError(format!("{}:{}", self.config.host, self.config.port))
            })?;

        let result = rebuild(self.config.build.clone())
            .await
            .map_err(ServerError::BuildError)?;
        tracing::info!(
            "Built {} pages ({} posts) in {}ms",
            result.pages,
            result.posts,
            result.duration_ms
        );

        let hub = ReloadHub::new();
        let session = Arc::new(RwLock::new(self.load_session().await));

        let build = &self.config.build;
        let watch_paths = vec![
            build.input_dir.clone(),
            build.public_dir.clone(),
            build.config_path.clone(),
        ];
        let (watcher, mut rx) =
            FileWatcher::new(&watch_paths).map_err(|e| ServerError::WatchError(e.to_string()))?;

        let watch_hub = hub.clone();
        let watch_build = build.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                tracing::debug!("Changed: {}", event.path().display());

                // Let a burst of saves settle into one rebuild
                tokio::time::sleep(Duration::from_millis(100)).await;
                while rx.try_recv().is_ok() {}

                match rebuild(watch_build.clone()).await {
                    Ok(result) => {
                        tracing::info!("Rebuilt {} pages in {}ms", result.pages, result.duration_ms);
                        watch_hub.send(ReloadMessage::Reload);
                    }
                    Err(message) => {
                        tracing::error!("Rebuild failed: {}", message);
                        watch_hub.send(ReloadMessage::BuildFailed { message });
                    }
                }
            }
            // Keep watcher alive
            drop(watcher);
        });

        let app = app(build, hub, session);

        tracing::info!("Starting dev server at http://{}", addr);
        tracing::info!("Settings page at http://{}{}", addr, SETUP_PATH);

        if self.config.open {
            let url = format!("http://{}", addr);
            if let Err(e) = open::that(&url) {
                tracing::debug!("Could not open browser: {}", e);
            }
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }

    async fn load_session(&self) -> SettingsSession {
        let backend: Box<dyn ConfigBackend> = match &self.config.save_endpoint {
            Some(endpoint) => {
                tracing::info!("Settings are saved through {}", endpoint);
                Box::new(HttpBackend::new(endpoint.clone()))
            }
            None => Box::new(FileBackend::new(self.config.build.config_path.clone())),
        };

        SettingsSession::load(backend, Box::new(MemoryStore::new())).await
    }
}

/// The dev server router: reload socket, loopback-only config and settings
/// routes, and the built site for everything else.
pub fn app(build: &BuildConfig, hub: ReloadHub, session: Arc<RwLock<SettingsSession>>) -> Router {
    let dev_only = config_api::routes(build.config_path.clone())
        .merge(setup::routes(session))
        // `layer` also covers the 405 answers for unsupported methods
        .layer(middleware::from_fn(require_loopback));

    Router::new()
        .route(RELOAD_SOCKET_PATH, get(ws_handler))
        .route(RELOAD_SCRIPT_PATH, get(reload_script_handler))
        .with_state(hub)
        .merge(dev_only)
        .fallback_service(ServeDir::new(&build.output_dir))
        .layer(TraceLayer::new_for_http())
}

/// Run a build off the async runtime.
async fn rebuild(config: BuildConfig) -> Result<BuildResult, String> {
    tokio::task::spawn_blocking(move || StaticBuilder::new(config).build())
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
}

/// Handler for the reload WebSocket endpoint.
async fn ws_handler(ws: WebSocketUpgrade, State(hub): State<ReloadHub>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, hub))
}

/// Forward reload messages to one client.
async fn handle_ws(mut socket: WebSocket, hub: ReloadHub) {
    let mut rx = hub.subscribe();

    if send(&mut socket, &ReloadMessage::Connected).await.is_err() {
        return;
    }

    while let Ok(msg) = rx.recv().await {
        if send(&mut socket, &msg).await.is_err() {
            break;
        }
    }
}

async fn send(socket: &mut WebSocket, msg: &ReloadMessage) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    socket.send(Message::Text(json.into())).await
}

/// Handler for the reload client script.
async fn reload_script_handler() -> impl IntoResponse {
    (
        [("content-type", "application/javascript")],
        reload_client_script(),
    )
}

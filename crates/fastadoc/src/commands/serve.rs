//! Preview server command.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::Router;
use fastadoc_server::HostedConfig;
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::config::ConfigFile;

/// Router serving `dir`, with the hosted save endpoint when configured.
pub fn app(dir: &Path, hosted: Option<HostedConfig>) -> Router {
    let mut router = Router::new();
    if let Some(hosted) = hosted {
        router = router.merge(fastadoc_server::hosted::routes(hosted));
    }

    router
        .fallback_service(ServeDir::new(dir))
        .layer(TraceLayer::new_for_http())
}

/// Run the serve command.
pub async fn run(
    config_path: &Path,
    port: u16,
    dir: Option<PathBuf>,
    hosted: Option<HostedConfig>,
) -> Result<()> {
    let dir = match dir {
        Some(dir) => dir,
        None => ConfigFile::load(config_path)?.paths.output,
    };

    if !dir.exists() {
        anyhow::bail!(
            "Directory not found: {}. Run 'fastadoc build' first.",
            dir.display()
        );
    }

    let addr: SocketAddr = format!("127.0.0.1:{}", port)
        .parse()
        .context("Invalid address")?;

    if let Some(hosted) = &hosted {
        match (&hosted.token, &hosted.repo) {
            (Some(_), Some(repo)) => tracing::info!("Config saves commit to {}", repo),
            _ => tracing::warn!("Hosted saves enabled without GITHUB_TOKEN and GITHUB_REPO"),
        }
    }

    tracing::info!("Serving {} at http://{}", dir.display(), addr);

    let app = app(&dir, hosted);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Open browser
    let url = format!("http://{}", addr);
    let _ = open::that(&url);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tempfile::tempdir;
    use tower::ServiceExt;

    #[tokio::test]
    async fn serves_directory_without_save_endpoint() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("index.html"), "<h1>Home</h1>").unwrap();
        let app = app(temp.path(), None);

        let home = app
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let save = app
            .oneshot(
                Request::post("/api/save-config")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(home.status(), StatusCode::OK);
        assert_ne!(save.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn hosted_mode_mounts_save_endpoint() {
        let temp = tempdir().unwrap();
        let app = app(temp.path(), Some(HostedConfig::new(None, None)));

        let response = app
            .oneshot(
                Request::post("/api/save-config")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

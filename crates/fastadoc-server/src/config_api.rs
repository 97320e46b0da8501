//! Development endpoints for reading and overwriting `config.json`.
//!
//! Only reachable from loopback addresses; see [`require_loopback`].

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{ConnectInfo, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use fastadoc_settings::SiteConfig;

/// Path of the configuration read endpoint.
pub const CONFIG_PATH: &str = "/config.json";

/// Path of the configuration write endpoint.
pub const SAVE_PATH: &str = "/api/save-config";

#[derive(Debug, Clone)]
struct ConfigApiState {
    config_path: Arc<PathBuf>,
}

/// Routes serving and overwriting the configuration file at `config_path`.
///
/// The loopback guard is not applied here; the caller layers it over all
/// dev-only routes at once.
pub fn routes(config_path: PathBuf) -> Router {
    Router::new()
        .route(CONFIG_PATH, get(read_config))
        .route(SAVE_PATH, post(save_config))
        .with_state(ConfigApiState {
            config_path: Arc::new(config_path),
        })
}

/// Reject requests whose peer is not a loopback address with 403.
///
/// Requests without connection info are rejected too.
pub async fn require_loopback(request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    match peer {
        Some(addr) if addr.ip().is_loopback() => next.run(request).await,
        Some(addr) => {
            tracing::warn!("Refused {} from {}", request.uri().path(), addr);
            (StatusCode::FORBIDDEN, "Forbidden").into_response()
        }
        None => (StatusCode::FORBIDDEN, "Forbidden").into_response(),
    }
}

async fn read_config(State(state): State<ConfigApiState>) -> Response {
    match tokio::fs::read_to_string(state.config_path.as_ref()).await {
        Ok(text) => (
            [
                (header::CONTENT_TYPE, "application/json"),
                (header::CACHE_CONTROL, "no-store"),
            ],
            text,
        )
            .into_response(),
        Err(e) => {
            tracing::debug!("Cannot read {}: {}", state.config_path.display(), e);
            (
                StatusCode::NOT_FOUND,
                [(header::CACHE_CONTROL, "no-store")],
                Json(json!({ "ok": false, "error": "config.json not found" })),
            )
                .into_response()
        }
    }
}

async fn save_config(State(state): State<ConfigApiState>, body: Bytes) -> Response {
    let text = String::from_utf8_lossy(&body);

    let config = match SiteConfig::from_json(&text) {
        Ok(config) => config,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "ok": false, "error": e.to_string() })),
            )
                .into_response()
        }
    };

    let json = match config.to_pretty_json() {
        Ok(json) => json,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "ok": false, "error": e.to_string() })),
            )
                .into_response()
        }
    };

    match tokio::fs::write(state.config_path.as_ref(), json).await {
        Ok(()) => {
            tracing::info!("Saved {}", state.config_path.display());
            Json(json!({ "ok": true })).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "ok": false, "error": e.to_string() })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use axum::{body::Body, http::Request as HttpRequest, middleware};
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use tempfile::tempdir;
    use tower::ServiceExt;

    fn guarded(config_path: PathBuf) -> Router {
        routes(config_path).layer(middleware::from_fn(require_loopback))
    }

    fn request(method: &str, uri: &str, body: &str, peer: Option<[u8; 4]>) -> HttpRequest<Body> {
        let mut request = HttpRequest::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        if let Some(ip) = peer {
            request
                .extensions_mut()
                .insert(ConnectInfo(SocketAddr::from((ip, 50000))));
        }
        request
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn reads_config_without_caching() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "{\"theme\":\"dark\"}\n").unwrap();

        let response = guarded(path)
            .oneshot(request("GET", CONFIG_PATH, "", Some([127, 0, 0, 1])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        assert_eq!(body_json(response).await["theme"], "dark");
    }

    #[tokio::test]
    async fn missing_config_is_json_404() {
        let temp = tempdir().unwrap();

        let response = guarded(temp.path().join("config.json"))
            .oneshot(request("GET", CONFIG_PATH, "", Some([127, 0, 0, 1])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["ok"], false);
    }

    #[tokio::test]
    async fn saves_pretty_config() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.json");

        let response = guarded(path.clone())
            .oneshot(request(
                "POST",
                SAVE_PATH,
                r#"{"theme":"dark_dimmed","commentsProvider":"waline","waline":{"serverURL":"https://c.example.com"}}"#,
                Some([127, 0, 0, 1]),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "ok": true }));

        let saved = fs::read_to_string(&path).unwrap();
        assert!(saved.ends_with("}\n"));
        assert!(saved.contains("\n  \"theme\": \"dark_dimmed\""));
        let value: Value = serde_json::from_str(&saved).unwrap();
        assert_eq!(value["waline"]["serverURL"], "https://c.example.com");
        assert_eq!(value["giscus"]["mapping"], "pathname");
    }

    #[tokio::test]
    async fn malformed_body_is_400() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "{\"theme\":\"dark\"}\n").unwrap();

        let response = guarded(path.clone())
            .oneshot(request("POST", SAVE_PATH, "{not json", Some([127, 0, 0, 1])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert!(body["error"].is_string());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"theme\":\"dark\"}\n");
    }

    #[tokio::test]
    async fn rejects_non_loopback_peers() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "{}\n").unwrap();

        for (method, uri, body) in [("GET", CONFIG_PATH, ""), ("POST", SAVE_PATH, "{}")] {
            let response = guarded(path.clone())
                .oneshot(request(method, uri, body, Some([192, 168, 1, 20])))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }

        let response = guarded(path.clone())
            .oneshot(request("PUT", CONFIG_PATH, "{}", Some([192, 168, 1, 20])))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = guarded(path)
            .oneshot(request("GET", CONFIG_PATH, "", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}

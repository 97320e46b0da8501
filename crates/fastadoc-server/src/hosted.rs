//! Hosted config persistence.
//!
//! `POST /api/save-config` commits the request body as `config.json` to a
//! GitHub repository through the contents API. The current file's `sha` is
//! fetched first and sent along with the new content; a write between the
//! two requests is not detected.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config_api::SAVE_PATH;

pub const GITHUB_API: &str = "https://api.github.com";
const COMMIT_MESSAGE: &str = "chore: update blog config";
const USER_AGENT: &str = "fast-adoc-blog";

/// Errors from talking to the repository host.
#[derive(Debug, thiserror::Error)]
pub enum HostedError {
    #[error("Missing server config")]
    MissingConfig,

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Repository host rejected the write with HTTP {0}")]
    Rejected(u16),
}

/// Server-held credentials and target of the hosted endpoint.
#[derive(Debug, Clone)]
pub struct HostedConfig {
    pub token: Option<String>,
    /// `owner/name`
    pub repo: Option<String>,
    pub api_base: String,
    /// File path inside the repository
    pub path: String,
}

impl HostedConfig {
    pub fn new(token: Option<String>, repo: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
            repo: repo.filter(|r| !r.is_empty()),
            api_base: GITHUB_API.to_string(),
            path: "config.json".to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// A client, if both token and repository are configured.
    pub fn client(&self) -> Result<RepoClient, HostedError> {
        match (&self.token, &self.repo) {
            (Some(token), Some(repo)) => Ok(RepoClient {
                client: reqwest::Client::new(),
                url: format!("{}/repos/{}/contents/{}", self.api_base, repo, self.path),
                token: token.clone(),
            }),
            _ => Err(HostedError::MissingConfig),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContentsEntry {
    sha: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutContents<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

/// Client for one file of one repository.
#[derive(Debug, Clone)]
pub struct RepoClient {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl RepoClient {
    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, &self.url)
            .header(reqwest::header::AUTHORIZATION, format!("token {}", self.token))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
    }

    /// Revision marker of the current file; `None` when the host has none to give.
    pub async fn current_sha(&self) -> Result<Option<String>, HostedError> {
        let response = self.request(reqwest::Method::GET).send().await?;
        if !response.status().is_success() {
            tracing::debug!("No current revision: HTTP {}", response.status());
            return Ok(None);
        }

        let entry: ContentsEntry = response.json().await?;
        Ok(entry.sha)
    }

    /// Write `content` as the new file, on top of revision `sha`.
    pub async fn put(&self, content: &str, sha: Option<String>) -> Result<(), HostedError> {
        let body = PutContents {
            message: COMMIT_MESSAGE,
            content: STANDARD.encode(content),
            sha,
        };

        let response = self.request(reqwest::Method::PUT).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(HostedError::Rejected(response.status().as_u16()));
        }
        Ok(())
    }

    /// Fetch the current revision and write `content` over it.
    pub async fn commit(&self, content: &str) -> Result<(), HostedError> {
        let sha = self.current_sha().await?;
        self.put(content, sha).await
    }
}

/// The hosted save endpoint. Other methods get 405.
pub fn routes(config: HostedConfig) -> Router {
    Router::new()
        .route(SAVE_PATH, post(save_config))
        .with_state(Arc::new(config))
}

async fn save_config(State(config): State<Arc<HostedConfig>>, body: Bytes) -> Response {
    let client = match config.client() {
        Ok(client) => client,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
        }
    };

    let text = String::from_utf8_lossy(&body);
    let content = if text.is_empty() { "{}" } else { text.as_ref() };

    match client.commit(content).await {
        Ok(()) => {
            tracing::info!("Committed config to {}", config.repo.as_deref().unwrap_or_default());
            StatusCode::OK.into_response()
        }
        Err(e) => {
            tracing::warn!("Hosted save failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::Mutex;

    use axum::{
        body::Body,
        http::{HeaderMap, Request},
        routing::get,
    };
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use tower::ServiceExt;

    #[derive(Debug, Clone, Default)]
    struct Recorded {
        get_auth: Option<String>,
        put_agent: Option<String>,
        put_body: Option<Value>,
    }

    type Shared = Arc<Mutex<Recorded>>;

    /// Mock contents API. `existing` controls whether GET finds the file,
    /// `accept` whether PUT succeeds.
    async fn mock_host(existing: bool, accept: bool) -> (SocketAddr, Shared) {
        let recorded: Shared = Arc::default();

        let app = Router::new()
            .route(
                "/repos/me/blog/contents/config.json",
                get(move |State(rec): State<Shared>, headers: HeaderMap| async move {
                    rec.lock().unwrap().get_auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    if existing {
                        (StatusCode::OK, Json(json!({ "sha": "abc123" })))
                    } else {
                        (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" })))
                    }
                })
                .put(
                    move |State(rec): State<Shared>, headers: HeaderMap, Json(body): Json<Value>| async move {
                        let mut rec = rec.lock().unwrap();
                        rec.put_agent = headers
                            .get("user-agent")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        rec.put_body = Some(body);
                        if accept {
                            StatusCode::OK
                        } else {
                            StatusCode::CONFLICT
                        }
                    },
                ),
            )
            .with_state(Arc::clone(&recorded));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, recorded)
    }

    fn config(addr: SocketAddr) -> HostedConfig {
        HostedConfig::new(Some("t0k".to_string()), Some("me/blog".to_string()))
            .with_api_base(format!("http://{}", addr))
    }

    fn save(body: &str) -> Request<Body> {
        Request::post(SAVE_PATH)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn commits_with_current_sha() {
        let (addr, recorded) = mock_host(true, true).await;

        let response = routes(config(addr))
            .oneshot(save(r#"{"theme":"dark"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let rec = recorded.lock().unwrap().clone();
        assert_eq!(rec.get_auth.as_deref(), Some("token t0k"));
        assert_eq!(rec.put_agent.as_deref(), Some("fast-adoc-blog"));
        let body = rec.put_body.unwrap();
        assert_eq!(body["message"], "chore: update blog config");
        assert_eq!(body["sha"], "abc123");
        let content = STANDARD.decode(body["content"].as_str().unwrap()).unwrap();
        assert_eq!(content, br#"{"theme":"dark"}"#);
    }

    #[tokio::test]
    async fn creates_file_without_sha_and_empty_body() {
        let (addr, recorded) = mock_host(false, true).await;

        let response = routes(config(addr)).oneshot(save("")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = recorded.lock().unwrap().put_body.clone().unwrap();
        assert!(body.get("sha").is_none());
        assert_eq!(body["content"], STANDARD.encode("{}"));
    }

    #[tokio::test]
    async fn rejected_put_is_500() {
        let (addr, _) = mock_host(true, false).await;

        let response = routes(config(addr)).oneshot(save("{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn unreachable_host_is_500_with_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let response = routes(config(addr)).oneshot(save("{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn missing_credentials_is_400() {
        let app = routes(HostedConfig::new(None, Some("me/blog".to_string())));

        let response = app.oneshot(save("{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Missing server config" }));
    }

    #[tokio::test]
    async fn other_methods_are_405() {
        let app = routes(HostedConfig::new(None, None));

        let response = app
            .oneshot(Request::get(SAVE_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}

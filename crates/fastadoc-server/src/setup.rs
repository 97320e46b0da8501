//! The development-only settings page.
//!
//! A server-rendered form over one [`SettingsSession`]. Each form post
//! mutates the session and redirects back to the page.

use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use minijinja::{context, Environment};
use serde::Deserialize;
use tokio::sync::RwLock;

use fastadoc_settings::{CommentsProvider, SettingsSession};

/// Path of the settings page.
pub const SETUP_PATH: &str = "/setup/";

type SharedSession = Arc<RwLock<SettingsSession>>;

#[derive(Clone)]
struct SetupState {
    session: SharedSession,
    templates: Arc<Environment<'static>>,
}

#[derive(Debug, Deserialize)]
struct ThemeForm {
    theme: String,
}

#[derive(Debug, Deserialize)]
struct ProviderForm {
    provider: String,
}

#[derive(Debug, Deserialize)]
struct SnippetForm {
    snippet: String,
}

#[derive(Debug, Deserialize)]
struct WalineForm {
    server_url: String,
}

/// Settings page routes over `session`.
pub fn routes(session: SharedSession) -> Router {
    let mut env = Environment::new();
    env.add_template("setup.html", SETUP_TEMPLATE)
        .expect("setup template is valid");

    Router::new()
        .route("/setup", get(|| async { Redirect::permanent(SETUP_PATH) }))
        .route(SETUP_PATH, get(page))
        .route("/setup/theme", post(select_theme))
        .route("/setup/provider", post(select_provider))
        .route("/setup/giscus", post(paste_snippet))
        .route("/setup/waline", post(set_waline))
        .route("/setup/save-local", post(save_local))
        .route("/setup/save-repo", post(save_repo))
        .with_state(SetupState {
            session,
            templates: Arc::new(env),
        })
}

async fn page(State(state): State<SetupState>) -> Response {
    let session = state.session.read().await;
    let draft = session.draft();

    let rendered = state
        .templates
        .get_template("setup.html")
        .and_then(|tmpl| {
            tmpl.render(context! {
                theme => session.applied_theme(),
                form => session.form(),
                giscus => &draft.giscus,
                preview => session.preview().to_html(),
                has_local_copy => session.local_copy().is_some(),
            })
        });

    match rendered {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Failed to render settings page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

fn back() -> Response {
    Redirect::to(SETUP_PATH).into_response()
}

fn bad_request(message: impl ToString) -> Response {
    (StatusCode::BAD_REQUEST, message.to_string()).into_response()
}

async fn select_theme(State(state): State<SetupState>, Form(form): Form<ThemeForm>) -> Response {
    match state.session.write().await.select_theme(&form.theme) {
        Ok(()) => back(),
        Err(e) => bad_request(e),
    }
}

async fn select_provider(
    State(state): State<SetupState>,
    Form(form): Form<ProviderForm>,
) -> Response {
    match CommentsProvider::from_name(&form.provider) {
        Some(provider) => {
            state.session.write().await.select_provider(provider);
            back()
        }
        None => bad_request(format!("Unknown comments provider: {}", form.provider)),
    }
}

async fn paste_snippet(State(state): State<SetupState>, Form(form): Form<SnippetForm>) -> Response {
    match state.session.write().await.paste_giscus_snippet(&form.snippet) {
        Ok(()) => back(),
        Err(e) => bad_request(e),
    }
}

async fn set_waline(State(state): State<SetupState>, Form(form): Form<WalineForm>) -> Response {
    state.session.write().await.set_waline_server(&form.server_url);
    back()
}

async fn save_local(State(state): State<SetupState>) -> Response {
    match state.session.write().await.save_local() {
        Ok(()) => back(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn save_repo(State(state): State<SetupState>) -> Response {
    // The session stays usable while the submission is in flight
    let pending = state.session.read().await.begin_remote_save();
    let result = pending.submit().await;

    // Failure is reported through the session status on the page
    let _ = state.session.write().await.record_remote_result(result);
    back()
}

const SETUP_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en" data-theme="{{ theme }}">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Setup</title>
  <link rel="stylesheet" href="/assets/main.css">
</head>
<body data-theme="{{ theme }}">
  <main class="main">
    <h1>Blog setup</h1>

    <section>
      <h2>Theme</h2>
      <form method="post" action="/setup/theme">
        <select name="theme">
          {% for option in form.themes %}
          <option value="{{ option.id }}"{% if option.selected %} selected{% endif %}>{{ option.id }}</option>
          {% endfor %}
        </select>
        <button type="submit">Apply</button>
      </form>
    </section>

    <section>
      <h2>Comments</h2>
      <form method="post" action="/setup/provider">
        {% for name in ["off", "giscus", "waline"] %}
        <label><input type="radio" name="provider" value="{{ name }}"{% if form.provider == name %} checked{% endif %}> {{ name }}</label>
        {% endfor %}
        <button type="submit">Switch</button>
      </form>

      {% if form.giscus_visible %}
      <form method="post" action="/setup/giscus" id="giscus">
        <p>Paste the script from giscus.app:</p>
        <textarea name="snippet" rows="8" cols="80"></textarea>
        <button type="submit">Use snippet</button>
        <dl>
          <dt>repo</dt><dd>{{ giscus.repo }}</dd>
          <dt>repoId</dt><dd>{{ giscus.repoId }}</dd>
          <dt>category</dt><dd>{{ giscus.category }}</dd>
          <dt>categoryId</dt><dd>{{ giscus.categoryId }}</dd>
          <dt>mapping</dt><dd>{{ giscus.mapping }}</dd>
        </dl>
      </form>
      {% endif %}

      {% if form.waline_visible %}
      <form method="post" action="/setup/waline" id="waline-settings">
        <label>Server URL <input type="url" name="server_url" value="{{ form.waline_server_url }}"></label>
        <button type="submit">Set</button>
      </form>
      {% endif %}
    </section>

    <section>
      <h2>Preview</h2>
      <div id="preview">{{ preview | safe }}</div>
    </section>

    <section>
      <form method="post" action="/setup/save-local" style="display:inline">
        <button type="submit">Save locally</button>
      </form>
      <form method="post" action="/setup/save-repo" style="display:inline">
        <button type="submit">Save to repo</button>
      </form>
      <span id="status">{% if form.status %}{{ form.status }}{% endif %}</span>
      {% if has_local_copy %}<p class="post-meta">A local preview copy is stored.</p>{% endif %}
    </section>
  </main>
</body>
</html>"##;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    use axum::{body::Body, http::header, http::Request};
    use tempfile::tempdir;
    use tower::ServiceExt;

    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::Value;
    use tokio::sync::Notify;

    use fastadoc_settings::{ConfigBackend, FileBackend, MemoryStore, SettingsError, SiteConfig};

    /// Backend whose submit waits until released.
    struct Gated {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl ConfigBackend for Gated {
        async fn fetch(&self) -> Result<Value, SettingsError> {
            Ok(serde_json::json!({}))
        }

        async fn submit(&self, _config: &SiteConfig) -> Result<(), SettingsError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(())
        }
    }

    async fn session(config: &Path) -> SharedSession {
        let session =
            SettingsSession::load(Box::new(FileBackend::new(config)), Box::new(MemoryStore::new()))
                .await;
        Arc::new(RwLock::new(session))
    }

    fn form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn renders_form_from_config() {
        let temp = tempdir().unwrap();
        let config = temp.path().join("config.json");
        fs::write(&config, r#"{"theme":"dark_dimmed","commentsProvider":"waline","waline":{"serverURL":"https://c.example.com"}}"#).unwrap();
        let app = routes(session(&config).await);

        let response = app
            .oneshot(Request::get(SETUP_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = text(response).await;
        assert!(html.contains("data-theme=\"dark_dimmed\""));
        assert!(html.contains("value=\"dark_dimmed\" selected"));
        assert!(html.contains("value=\"waline\" checked"));
        assert!(html.contains("id=\"waline-settings\""));
        assert!(!html.contains("id=\"giscus\""));
        assert!(html.contains("<div id=\"waline\"></div>"));
    }

    #[tokio::test]
    async fn form_posts_mutate_session() {
        let temp = tempdir().unwrap();
        let shared = session(&temp.path().join("config.json")).await;
        let app = routes(Arc::clone(&shared));

        let response = app
            .clone()
            .oneshot(form("/setup/theme", "theme=nolanlawson"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], SETUP_PATH);

        app.clone()
            .oneshot(form("/setup/provider", "provider=giscus"))
            .await
            .unwrap();
        app.clone()
            .oneshot(form(
                "/setup/giscus",
                "snippet=%3Cscript+src%3D%22https%3A%2F%2Fgiscus.app%2Fclient.js%22+data-repo%3D%22me%2Fblog%22+data-repo-id%3D%22R_1%22%3E%3C%2Fscript%3E",
            ))
            .await
            .unwrap();

        let session = shared.read().await;
        assert_eq!(session.draft().theme, "nolanlawson");
        assert_eq!(session.applied_theme(), "nolanlawson");
        assert_eq!(session.draft().comments_provider, CommentsProvider::Giscus);
        assert_eq!(session.draft().giscus.repo, "me/blog");
        assert_eq!(session.draft().giscus.repo_id, "R_1");
        assert!(!session.preview().is_placeholder());
    }

    #[tokio::test]
    async fn rejects_unknown_values() {
        let temp = tempdir().unwrap();
        let shared = session(&temp.path().join("config.json")).await;
        let app = routes(Arc::clone(&shared));

        let theme = app
            .clone()
            .oneshot(form("/setup/theme", "theme=neon"))
            .await
            .unwrap();
        let provider = app
            .clone()
            .oneshot(form("/setup/provider", "provider=disqus"))
            .await
            .unwrap();
        let snippet = app
            .oneshot(form("/setup/giscus", "snippet=hello"))
            .await
            .unwrap();

        assert_eq!(theme.status(), StatusCode::BAD_REQUEST);
        assert_eq!(provider.status(), StatusCode::BAD_REQUEST);
        assert_eq!(snippet.status(), StatusCode::BAD_REQUEST);
        assert_eq!(shared.read().await.draft().theme, "light");
    }

    #[tokio::test]
    async fn save_repo_writes_config_file() {
        let temp = tempdir().unwrap();
        let config = temp.path().join("config.json");
        let shared = session(&config).await;
        let app = routes(Arc::clone(&shared));

        app.clone()
            .oneshot(form("/setup/waline", "server_url=++https%3A%2F%2Fw.example.com++"))
            .await
            .unwrap();
        app.clone()
            .oneshot(form("/setup/save-local", ""))
            .await
            .unwrap();
        let response = app.oneshot(form("/setup/save-repo", "")).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let saved: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&config).unwrap()).unwrap();
        assert_eq!(saved["waline"]["serverURL"], "https://w.example.com");
        let session = shared.read().await;
        assert!(session.local_copy().is_some());
        assert_eq!(
            session.status(),
            Some("Saved to repo (site will use it on next build)")
        );
    }

    #[tokio::test]
    async fn page_stays_usable_while_repo_save_is_pending() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let backend = Gated {
            entered: Arc::clone(&entered),
            release: Arc::clone(&release),
        };
        let shared = Arc::new(RwLock::new(
            SettingsSession::load(Box::new(backend), Box::new(MemoryStore::new())).await,
        ));
        let app = routes(Arc::clone(&shared));

        let saving = tokio::spawn(app.clone().oneshot(form("/setup/save-repo", "")));
        entered.notified().await;

        let page = tokio::time::timeout(
            Duration::from_secs(1),
            app.clone()
                .oneshot(Request::get(SETUP_PATH).body(Body::empty()).unwrap()),
        )
        .await
        .expect("settings page answers during a pending save")
        .unwrap();
        let theme = tokio::time::timeout(
            Duration::from_secs(1),
            app.oneshot(form("/setup/theme", "theme=dark")),
        )
        .await
        .expect("form posts answer during a pending save")
        .unwrap();

        assert_eq!(page.status(), StatusCode::OK);
        assert_eq!(theme.status(), StatusCode::SEE_OTHER);

        release.notify_one();
        let saved = saving.await.unwrap().unwrap();

        assert_eq!(saved.status(), StatusCode::SEE_OTHER);
        let session = shared.read().await;
        assert_eq!(session.draft().theme, "dark");
        assert_eq!(
            session.status(),
            Some("Saved to repo (site will use it on next build)")
        );
    }
}

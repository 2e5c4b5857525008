//! Static page server with the two configuration delivery modes.

use std::{
    io::ErrorKind,
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, bail};
use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::ValueEnum;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use widget_core::{Config, Settings, inject_config, loader::CONFIG_ENDPOINT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Inject the settings-file configuration into every served HTML page.
    Push,
    /// Serve pages untouched; clients fetch `/api/config`.
    Pull,
}

#[derive(Debug, Clone)]
pub struct ServerState {
    pub root: PathBuf,
    pub settings: PathBuf,
    pub mode: Mode,
}

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route(CONFIG_ENDPOINT, get(api_config))
        .fallback(serve_file)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(state: ServerState, port: u16) -> anyhow::Result<()> {
    if state.mode == Mode::Push {
        // Refuse to start rather than serve pages without configuration.
        let settings = Settings::load(&state.settings)
            .with_context(|| "push mode needs a settings file; run `weather-widget configure`")?;
        let config = Config::from_settings(&settings);
        let api_key = if config.has_api_key() { "set" } else { "NOT SET" };
        info!(
            api_key,
            language = %config.language,
            unit = %config.unit,
            provider = %config.provider,
            "settings loaded from {}",
            state.settings.display()
        );
    }

    if !state.root.is_dir() {
        bail!("document root {} is not a directory", state.root.display());
    }

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(mode = ?state.mode, root = %state.root.display(), "server running at http://localhost:{port}");

    axum::serve(listener, router(Arc::new(state))).await.context("server terminated")?;
    Ok(())
}

/// Flat configuration record resolved from the process environment.
async fn api_config() -> impl IntoResponse {
    let config = Config::from_env();
    if !config.has_api_key() {
        warn!("serving configuration without an API key");
    }
    ([(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")], Json(config.to_record()))
}

async fn serve_file(State(state): State<Arc<ServerState>>, uri: Uri) -> Response {
    let Some(relative) = sanitize(uri.path()) else {
        return not_found();
    };
    let path = state.root.join(&relative);
    if path.is_dir() {
        return not_found();
    }

    let content = match tokio::fs::read(&path).await {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return not_found(),
        Err(err) => {
            error!(path = %path.display(), error = %err, "failed to read file");
            return server_error(&format!("Sorry, check with the site admin for error: {:?}", err.kind()));
        }
    };

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    let is_html = is_html(&path);

    if is_html && state.mode == Mode::Push {
        let settings = match Settings::load(&state.settings) {
            Ok(settings) => settings,
            Err(err) => {
                error!(error = %err, "cannot inject configuration");
                return server_error("Configuration unavailable");
            }
        };
        let page = inject_config(&String::from_utf8_lossy(&content), &Config::from_settings(&settings));
        return ([(header::CONTENT_TYPE, mime.as_ref())], page).into_response();
    }

    ([(header::CONTENT_TYPE, mime.as_ref())], content).into_response()
}

/// Map a request path onto a relative file path, rejecting anything that
/// could leave the document root. Percent-escapes are decoded first, so an
/// encoded `..` is rejected like a literal one.
fn sanitize(request_path: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(request_path).ok()?;
    let trimmed = decoded.trim_start_matches('/');
    if trimmed.is_empty() {
        return Some(PathBuf::from("index.html"));
    }

    let path = Path::new(trimmed);
    path.components()
        .all(|c| matches!(c, Component::Normal(_)))
        .then(|| path.to_path_buf())
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html("<h1>404 - File Not Found</h1>")).into_response()
}

fn server_error(message: &str) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, message.to_string()).into_response()
}

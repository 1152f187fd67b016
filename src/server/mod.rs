//! HTTP server: page routes and the thin JSON endpoints

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::SiteConfig;
use crate::content::list;
use crate::content::post::PostSummary;
use crate::content::resolve;
use crate::content::source::ContentSource;
use crate::error::Error;
use crate::templates::TemplateRenderer;
use crate::SpaceTraveling;

/// Cookie carrying the content-source preview ref. Present iff preview
/// mode is active.
const PREVIEW_COOKIE: &str = "preview_ref";

/// Shared server state
struct ServerState {
    config: SiteConfig,
    source: Arc<dyn ContentSource>,
    templates: TemplateRenderer,
}

/// Start the server.
pub async fn start(app: &SpaceTraveling, ip: &str, port: u16) -> Result<()> {
    let state = Arc::new(ServerState {
        config: app.config.clone(),
        source: app.source.clone(),
        templates: TemplateRenderer::new()?,
    });

    let router = Router::new()
        .route("/", get(home_handler))
        .route("/post/:slug", get(post_handler))
        .route("/api/posts", get(continuation_handler))
        .route("/api/utterances", get(utterances_handler))
        .route("/api/preview", get(preview_handler))
        .route("/api/exit-preview", get(exit_preview_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

/// Extract the preview ref from the request cookies.
fn preview_ref(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    parse_cookie(cookies, PREVIEW_COOKIE)
}

fn parse_cookie(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key.trim() == name && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// True when `cursor` points at the same origin as the configured
/// content API. Continuation cursors come back from the content source;
/// anything else handed to the proxy endpoint is rejected so the server
/// never fetches caller-chosen URLs.
fn trusted_cursor(content_api: &str, cursor: &str) -> bool {
    let (Ok(api), Ok(cursor)) = (
        reqwest::Url::parse(content_api),
        reqwest::Url::parse(cursor),
    ) else {
        return false;
    };

    api.scheme() == cursor.scheme()
        && api.host_str() == cursor.host_str()
        && api.port_or_known_default() == cursor.port_or_known_default()
}

/// Wrap a rendered page, falling back to a bare 500 if rendering fails.
fn page_response(status: StatusCode, rendered: Result<String>) -> Response {
    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => {
            tracing::error!("template render failed: {:#}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
    }
}

/// Map a content error onto a status code and fallback page.
fn error_page(state: &ServerState, err: Error) -> Response {
    match err {
        Error::NotFound(slug) => {
            tracing::debug!("post not found: {}", slug);
            page_response(
                StatusCode::NOT_FOUND,
                state.templates.render_not_found(&state.config),
            )
        }
        Error::ContentSource(cause) => {
            tracing::error!("content source failure: {}", cause);
            page_response(
                StatusCode::BAD_GATEWAY,
                state.templates.render_error(&state.config),
            )
        }
        other => {
            tracing::error!("unexpected error: {}", other);
            page_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                state.templates.render_error(&state.config),
            )
        }
    }
}

async fn home_handler(State(state): State<Arc<ServerState>>, headers: HeaderMap) -> Response {
    let preview = preview_ref(&headers);
    match list::fetch_first_page(
        state.source.as_ref(),
        state.config.page_size,
        preview.as_deref(),
    )
    .await
    {
        Ok(posts) => page_response(
            StatusCode::OK,
            state
                .templates
                .render_home(&state.config, &posts, preview.is_some()),
        ),
        Err(err) => error_page(&state, err),
    }
}

async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Response {
    let preview = preview_ref(&headers);
    match resolve::resolve(state.source.as_ref(), &slug, preview.as_deref()).await {
        Ok(resolved) => page_response(
            StatusCode::OK,
            state
                .templates
                .render_post(&state.config, &resolved, preview.is_some()),
        ),
        Err(err) => error_page(&state, err),
    }
}

#[derive(Debug, Deserialize)]
struct ContinuationParams {
    page: String,
}

/// List continuation: proxy an opaque cursor to the content source and
/// return the page as `{results, next_page}`. Cursors not belonging to
/// the content API origin are rejected before any fetch happens.
async fn continuation_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<ContinuationParams>,
) -> Response {
    if !trusted_cursor(&state.config.content_api, &params.page) {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "cursor does not belong to the content source" })),
        )
            .into_response();
    }

    match state.source.fetch_page(&params.page).await {
        Ok(page) => {
            let results: Vec<PostSummary> = page.results.iter().map(PostSummary::from).collect();
            Json(serde_json::json!({
                "results": results,
                "next_page": page.next_page,
            }))
            .into_response()
        }
        Err(err) => {
            tracing::error!("continuation fetch failed: {}", err);
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": "content source unavailable" })),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct UtterancesParams {
    repo: Option<String>,
    theme: Option<String>,
}

/// Comment-widget configuration: a flat attribute map for the embed
/// script. Always 200.
async fn utterances_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<UtterancesParams>,
) -> Json<serde_json::Value> {
    Json(widget_attributes(
        &state.config,
        params.repo.as_deref(),
        params.theme.as_deref(),
    ))
}

fn widget_attributes(
    config: &SiteConfig,
    repo: Option<&str>,
    theme: Option<&str>,
) -> serde_json::Value {
    serde_json::json!({
        "repo": repo.unwrap_or(&config.comments.repo),
        "theme": theme.unwrap_or(&config.comments.theme),
        "src": "https://utteranc.es/client.js",
        "issue-term": "pathname",
        "crossorigin": "anonymous",
        "async": true,
    })
}

#[derive(Debug, Deserialize)]
struct PreviewParams {
    token: String,
}

fn redirect_with_cookie(cookie: String) -> Response {
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, "/".to_string()),
            (header::SET_COOKIE, cookie),
        ],
    )
        .into_response()
}

/// Enter preview mode: store the preview ref in a session cookie and
/// send the browser back with a 302.
async fn preview_handler(Query(params): Query<PreviewParams>) -> Response {
    let cookie = format!("{}={}; Path=/; HttpOnly", PREVIEW_COOKIE, params.token);
    redirect_with_cookie(cookie)
}

/// Exit preview mode: clear the cookie.
async fn exit_preview_handler() -> Response {
    let cookie = format!("{}=; Path=/; HttpOnly; Max-Age=0", PREVIEW_COOKIE);
    redirect_with_cookie(cookie)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cookie() {
        assert_eq!(
            parse_cookie("a=1; preview_ref=tok-123; b=2", "preview_ref"),
            Some("tok-123".to_string())
        );
        assert_eq!(parse_cookie("a=1; b=2", "preview_ref"), None);
        assert_eq!(parse_cookie("preview_ref=", "preview_ref"), None);
    }

    #[test]
    fn test_trusted_cursor_accepts_content_api_origin() {
        let api = "https://blog.cdn.prismic.io/api/v2";
        assert!(trusted_cursor(
            api,
            "https://blog.cdn.prismic.io/api/v2/documents/search?page=2&ref=x"
        ));
        // Any path on the same origin is still the content source
        assert!(trusted_cursor(api, "https://blog.cdn.prismic.io/other"));
    }

    #[test]
    fn test_trusted_cursor_rejects_foreign_urls() {
        let api = "https://blog.cdn.prismic.io/api/v2";
        assert!(!trusted_cursor(api, "https://evil.example/steal"));
        assert!(!trusted_cursor(api, "http://blog.cdn.prismic.io/api/v2"));
        assert!(!trusted_cursor(api, "https://blog.cdn.prismic.io:8443/api/v2"));
        assert!(!trusted_cursor(api, "https://169.254.169.254/latest/meta-data/"));
        assert!(!trusted_cursor(api, "file:///etc/passwd"));
        assert!(!trusted_cursor(api, "not a url"));
    }

    #[test]
    fn test_widget_attributes_defaults() {
        let mut config = SiteConfig::default();
        config.comments.repo = "user/comments".to_string();

        let attrs = widget_attributes(&config, None, None);
        assert_eq!(attrs["repo"], "user/comments");
        assert_eq!(attrs["theme"], "github-dark");
        assert_eq!(attrs["src"], "https://utteranc.es/client.js");
        assert_eq!(attrs["issue-term"], "pathname");
        assert_eq!(attrs["async"], true);
    }

    #[test]
    fn test_widget_attributes_overrides() {
        let config = SiteConfig::default();
        let attrs = widget_attributes(&config, Some("other/repo"), Some("github-light"));
        assert_eq!(attrs["repo"], "other/repo");
        assert_eq!(attrs["theme"], "github-light");
    }

    #[tokio::test]
    async fn test_preview_toggles_redirect_with_302() {
        let response = preview_handler(Query(PreviewParams {
            token: "tok-123".to_string(),
        }))
        .await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/");
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.contains("preview_ref=tok-123"));

        let response = exit_preview_handler().await;
        assert_eq!(response.status(), StatusCode::FOUND);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }
}

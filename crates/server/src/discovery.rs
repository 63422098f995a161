//! The `llms.txt` route and the `Link` header pointing at it.

use axum::Router;
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_TYPE, HOST, LINK};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use llms_txt_core::MARKDOWN_CONTENT_TYPE;
use url::Url;

use crate::AppState;
use crate::response::apply_cache_headers;

/// Router serving the discovery document at its configured path.
pub fn routes(state: AppState) -> Router {
    let path = format!("/{}", state.config.path);
    Router::new().route(&path, get(llms_txt)).with_state(state)
}

async fn llms_txt(State(state): State<AppState>) -> Response {
    let body = state.discovery_document.to_string();
    let mut response = ([(CONTENT_TYPE, MARKDOWN_CONTENT_TYPE)], body.clone()).into_response();

    if let Some(cache) = &state.cache {
        apply_cache_headers(response.headers_mut(), cache, &body);
    }

    response
}

/// Adds `Link: <...>; rel="llms-txt"` to every response.
pub async fn link_header(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let host = request
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut response = next.run(request).await;

    let url = discovery_url(state.config.app_url.as_deref(), host.as_deref(), &state.config.path);
    match HeaderValue::from_str(&format!("<{}>; rel=\"llms-txt\"", url)) {
        Ok(value) => {
            response.headers_mut().insert(LINK, value);
        }
        Err(e) => tracing::debug!(url = %url, error = %e, "discovery url is not a valid header value"),
    }

    response
}

/// Absolute URL of the discovery document.
///
/// Uses `app_url` when it parses, else `http://{host}`, else the bare path.
pub fn discovery_url(app_url: Option<&str>, host: Option<&str>, path: &str) -> String {
    let path = path.trim_start_matches('/');

    let base = app_url
        .and_then(|u| Url::parse(&format!("{}/", u.trim_end_matches('/'))).ok())
        .or_else(|| host.and_then(|h| Url::parse(&format!("http://{}/", h)).ok()));

    match base.and_then(|b| b.join(path).ok()) {
        Some(url) => url.to_string(),
        None => format!("/{}", path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_url_prefers_app_url() {
        assert_eq!(
            discovery_url(Some("https://example.com"), Some("internal:8080"), "llms.txt"),
            "https://example.com/llms.txt"
        );
        assert_eq!(
            discovery_url(Some("https://example.com/app/"), None, "/ai/llms.txt"),
            "https://example.com/app/ai/llms.txt"
        );
    }

    #[test]
    fn test_discovery_url_from_host() {
        assert_eq!(discovery_url(None, Some("localhost:8080"), "llms.txt"), "http://localhost:8080/llms.txt");
    }

    #[test]
    fn test_discovery_url_bare_path() {
        assert_eq!(discovery_url(None, None, "llms.txt"), "/llms.txt");
        assert_eq!(discovery_url(Some("not a url"), None, "llms.txt"), "/llms.txt");
    }
}

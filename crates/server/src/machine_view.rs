//! The machine-view middleware.
//!
//! Applied around the whole site router. A `<path>.md` request is rewritten
//! to `<path>` before routing and its HTML response is always converted; any
//! other request is converted when the classifier says the caller wants
//! Markdown. Non-HTML and encoded responses pass through untouched.

use axum::body::to_bytes;
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_ENCODING, CONTENT_TYPE};
use axum::http::uri::PathAndQuery;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use llms_txt_core::{FALLBACK_DOCUMENT, IncomingRequest, is_discovery_path, is_html_content_type};

use crate::AppState;
use crate::response::markdown_response;

const MD_SUFFIX: &str = ".md";

/// Upstream bodies larger than this multiple of `max_html_length` are not
/// buffered; they get the fallback document instead.
const BODY_LIMIT_FACTOR: usize = 4;

pub async fn machine_view(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let config = state.view.config();
    if !config.enabled {
        return next.run(request).await;
    }

    if config.md_extension_enabled
        && let Some(stripped) = strip_md_suffix(request.uri().path())
    {
        if is_discovery_path(stripped, &config.discovery_path) {
            return StatusCode::NOT_FOUND.into_response();
        }

        let stripped = stripped.to_string();
        let request = match rewrite_path(request, &stripped) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(path = %stripped, error = %e, "could not rewrite .md request");
                return StatusCode::BAD_REQUEST.into_response();
            }
        };

        let response = next.run(request).await;
        return convert_response(&state, response).await;
    }

    let wants_markdown = state.view.wants_machine_view(&incoming_request(&request));
    let response = next.run(request).await;

    if wants_markdown { convert_response(&state, response).await } else { response }
}

/// `/docs/page.md` -> `/docs/page`. `None` for paths without the suffix or
/// with nothing in front of it.
pub fn strip_md_suffix(path: &str) -> Option<&str> {
    let stripped = path.strip_suffix(MD_SUFFIX)?;
    (!stripped.trim_matches('/').is_empty()).then_some(stripped)
}

fn rewrite_path(mut request: Request, path: &str) -> Result<Request, axum::http::Error> {
    let path_and_query = match request.uri().query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    };

    let mut parts = request.uri().clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query)?);
    *request.uri_mut() = Uri::from_parts(parts)?;
    Ok(request)
}

/// Snapshot of the request parts the classifier reads.
pub fn incoming_request(request: &Request) -> IncomingRequest {
    let mut incoming = IncomingRequest::new(request.method().as_str(), request.uri().path())
        .with_query_string(request.uri().query().unwrap_or_default());

    for (name, value) in request.headers() {
        if let Ok(value) = value.to_str() {
            incoming.push_header(name.as_str(), value);
        }
    }

    incoming
}

async fn convert_response(state: &AppState, response: Response) -> Response {
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !is_html_content_type(content_type) {
        return response;
    }

    if is_encoded(response.headers()) {
        tracing::debug!("response body is content-encoded, skipping machine view");
        return response;
    }

    let (parts, body) = response.into_parts();
    let markdown = match to_bytes(body, body_limit(state.view.config().max_html_length)).await {
        Ok(bytes) => state.view.render(&String::from_utf8_lossy(&bytes)).markdown,
        Err(e) => {
            tracing::warn!(error = %e, "could not read upstream body, serving fallback document");
            FALLBACK_DOCUMENT.to_string()
        }
    };

    markdown_response(parts, markdown, state.cache.as_ref())
}

/// Most bytes buffered from an upstream body. A zero `max_html_length`
/// disables the size guard and the bound with it.
fn body_limit(max_html_length: usize) -> usize {
    if max_html_length == 0 { usize::MAX } else { max_html_length.saturating_mul(BODY_LIMIT_FACTOR) }
}

fn is_encoded(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|encoding| !encoding.trim().eq_ignore_ascii_case("identity"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_strip_md_suffix() {
        assert_eq!(strip_md_suffix("/docs/page.md"), Some("/docs/page"));
        assert_eq!(strip_md_suffix("/llms.txt.md"), Some("/llms.txt"));
        assert_eq!(strip_md_suffix("/page"), None);
        assert_eq!(strip_md_suffix("/.md"), None);
        assert_eq!(strip_md_suffix("/readme.markdown"), None);
    }

    #[test]
    fn test_rewrite_path_keeps_query() {
        let request = axum::http::Request::builder().uri("/docs/page.md?lang=en&x=1").body(Body::empty()).unwrap();
        let request = rewrite_path(request, "/docs/page").unwrap();
        assert_eq!(request.uri().path(), "/docs/page");
        assert_eq!(request.uri().query(), Some("lang=en&x=1"));
    }

    #[test]
    fn test_incoming_request_snapshot() {
        let request = axum::http::Request::builder()
            .uri("/page?view=machine")
            .header("Accept", "text/markdown")
            .header("X-View", "machine")
            .body(Body::empty())
            .unwrap();
        let incoming = incoming_request(&request);

        assert_eq!(incoming.method, "GET");
        assert_eq!(incoming.path, "/page");
        assert_eq!(incoming.query_param("view"), Some("machine"));
        assert_eq!(incoming.header("accept"), Some("text/markdown"));
        assert_eq!(incoming.header("x-view"), Some("machine"));
    }

    #[test]
    fn test_body_limit() {
        assert_eq!(body_limit(500_000), 2_000_000);
        assert_eq!(body_limit(0), usize::MAX);
        assert_eq!(body_limit(usize::MAX), usize::MAX);
    }

    #[test]
    fn test_is_encoded() {
        let mut headers = HeaderMap::new();
        assert!(!is_encoded(&headers));
        headers.insert(CONTENT_ENCODING, "identity".parse().unwrap());
        assert!(!is_encoded(&headers));
        headers.insert(CONTENT_ENCODING, "gzip".parse().unwrap());
        assert!(is_encoded(&headers));
    }
}

//! Builds the Markdown response that replaces an HTML one.

use axum::body::Body;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::response::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;
use llms_txt_core::{CacheConfig, MARKDOWN_CONTENT_TYPE};

/// Replaces the body of an upstream response with `markdown`.
///
/// Status and every header except `Content-Type` and `Content-Length` are
/// kept, repeated headers included. Cache headers go on last and replace any
/// upstream header of the same name.
pub fn markdown_response(mut parts: Parts, markdown: String, cache: Option<&CacheConfig>) -> Response {
    parts.headers.remove(CONTENT_TYPE);
    parts.headers.remove(CONTENT_LENGTH);
    parts.headers.insert(CONTENT_TYPE, HeaderValue::from_static(MARKDOWN_CONTENT_TYPE));

    if let Some(cache) = cache {
        apply_cache_headers(&mut parts.headers, cache, &markdown);
    }

    Response::from_parts(parts, Body::from(markdown))
}

/// Sets `Cache-Control` and, when enabled, `ETag` for `body`.
pub fn apply_cache_headers(headers: &mut HeaderMap, cache: &CacheConfig, body: &str) {
    for (name, value) in cache.headers_for(body) {
        match HeaderValue::from_str(&value) {
            Ok(value) => {
                headers.insert(name, value);
            }
            Err(e) => tracing::debug!(header = name, error = %e, "skipping invalid cache header"),
        }
    }
}

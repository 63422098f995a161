//! Request classification: does the caller want the machine view?
//!
//! [`IncomingRequest`] is a framework-independent snapshot of the parts of a
//! request the classifier looks at. [`is_machine_request`] is a pure function
//! of that snapshot and the configured [`TriggerMode`].
//!
//! # Example
//!
//! ```rust
//! use llms_txt_core::{IncomingRequest, TriggerMode, is_machine_request};
//!
//! let request = IncomingRequest::new("GET", "/docs").with_query_string("view=machine");
//! assert!(is_machine_request(&request, TriggerMode::Query, "llms.txt"));
//! ```

use std::collections::HashMap;

use crate::config::TriggerMode;

/// Media type a caller sends in `Accept` to ask for Markdown.
pub const MARKDOWN_MEDIA_TYPE: &str = "text/markdown";

/// Content type of every Markdown response.
pub const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=UTF-8";

/// Custom header carrying the view preference.
pub const VIEW_HEADER: &str = "X-View";

/// The request parts the classifier reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomingRequest {
    pub method: String,
    /// Request path, with or without a leading slash.
    pub path: String,
    /// Decoded query parameters. A repeated key keeps its last value.
    pub query: HashMap<String, String>,
    /// Header names as received, each with every value in order.
    headers: Vec<(String, Vec<String>)>,
}

impl IncomingRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self { method: method.into(), path: path.into(), ..Default::default() }
    }

    /// Parses and adds the parameters of a raw (undecoded) query string.
    pub fn with_query_string(mut self, query: &str) -> Self {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            self.query.insert(key.into_owned(), value.into_owned());
        }
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Appends a header value. Names are matched case-insensitively.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_header(name, value);
        self
    }

    pub fn push_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.headers.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
            Some((_, values)) => values.push(value),
            None => self.headers.push((name, vec![value])),
        }
    }

    /// First value of header `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).first().map(String::as_str)
    }

    /// Every value of header `name`, in order received.
    pub fn header_values(&self, name: &str) -> &[String] {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.as_slice())
            .unwrap_or_default()
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Path without leading or trailing slashes.
    pub fn normalized_path(&self) -> &str {
        self.path.trim_matches('/')
    }
}

/// True when `path` addresses the discovery document itself.
pub fn is_discovery_path(path: &str, discovery_path: &str) -> bool {
    path.trim_matches('/') == discovery_path.trim_matches('/')
}

/// Decides whether `request` asks for the machine view under `mode`.
///
/// The discovery document's own path is never classified as a machine
/// request.
pub fn is_machine_request(request: &IncomingRequest, mode: TriggerMode, discovery_path: &str) -> bool {
    if is_discovery_path(&request.path, discovery_path) {
        return false;
    }

    (mode.checks_query() && wants_markdown_by_query(request))
        || (mode.checks_accept() && wants_markdown_by_accept(request))
        || (mode.checks_header() && wants_markdown_by_header(request))
}

fn wants_markdown_by_query(request: &IncomingRequest) -> bool {
    request.query_param("view") == Some("machine") || request.query_param("format") == Some("markdown")
}

fn wants_markdown_by_accept(request: &IncomingRequest) -> bool {
    request
        .header("Accept")
        .is_some_and(|accept| accept.to_lowercase().contains(MARKDOWN_MEDIA_TYPE))
}

fn wants_markdown_by_header(request: &IncomingRequest) -> bool {
    request.header(VIEW_HEADER) == Some("machine")
}

/// True when a `Content-Type` value denotes HTML.
pub fn is_html_content_type(content_type: &str) -> bool {
    content_type.to_lowercase().contains("text/html")
}

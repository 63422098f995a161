//! HTML preprocessing ahead of Markdown conversion.
//!
//! Three stages run in order, none of which can fail from the caller's point
//! of view:
//!
//! 1. [`narrow_to_selector`] keeps only the configured main-content sub-tree.
//! 2. [`strip_non_content_tags`] drops scripts, styles and embedded media.
//! 3. [`enforce_size_limit`] caps what is handed to the converter.

use std::sync::LazyLock;

use regex::Regex;

use crate::parse::Document;

/// Elements removed, content included, before conversion.
pub const NON_CONTENT_TAGS: [&str; 11] = [
    "script", "style", "noscript", "template", "iframe", "svg", "canvas", "video", "audio", "source", "track",
];

/// One alternative per tag so every opening tag is paired with its own
/// closing tag: `<script ...>...</script>`, shortest match first.
static NON_CONTENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<String> = NON_CONTENT_TAGS
        .iter()
        .map(|tag| format!(r"<{tag}\b[^>]*>.*?</{tag}>"))
        .collect();
    Regex::new(&format!("(?is){}", alternatives.join("|"))).expect("non-content tag pattern is valid")
});

/// Why the narrower kept the full document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrowFallback {
    /// No selector configured.
    NoSelector,
    /// The selector parsed but matched nothing.
    NoMatch,
    /// The selector could not be parsed.
    InvalidSelector(String),
}

/// Outcome of the content narrower.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Narrowing {
    /// Outer HTML of the first matching element.
    Selected(String),
    /// Keep the input unchanged.
    Fallback(NarrowFallback),
}

impl Narrowing {
    /// The HTML to continue with: the selection, or `original`.
    pub fn into_html(self, original: &str) -> String {
        match self {
            Self::Selected(html) => html,
            Self::Fallback(_) => original.to_string(),
        }
    }
}

/// Selects the first sub-tree matching `selector`.
pub fn narrow_to_selector(html: &str, selector: Option<&str>) -> Narrowing {
    let Some(selector) = selector.filter(|s| !s.trim().is_empty()) else {
        return Narrowing::Fallback(NarrowFallback::NoSelector);
    };

    let doc = Document::parse(html);
    match doc.select_first(selector) {
        Ok(Some(element)) => Narrowing::Selected(element.outer_html()),
        Ok(None) => {
            tracing::debug!(selector, "main content selector matched nothing, converting full page");
            Narrowing::Fallback(NarrowFallback::NoMatch)
        }
        Err(e) => {
            tracing::debug!(selector, error = %e, "main content selector rejected, converting full page");
            Narrowing::Fallback(NarrowFallback::InvalidSelector(e.to_string()))
        }
    }
}

/// Removes every [`NON_CONTENT_TAGS`] element together with its content.
pub fn strip_non_content_tags(html: &str) -> String {
    NON_CONTENT_RE.replace_all(html, "").into_owned()
}

/// Truncates `html` to at most `max_len` bytes (0 = unlimited).
///
/// Cuts at the last character boundary at or before `max_len`, so the result
/// is exactly `max_len` bytes unless that byte falls inside a multi-byte
/// character. Tag boundaries are not respected. Returns whether anything was
/// cut.
pub fn enforce_size_limit(html: &mut String, max_len: usize) -> bool {
    if max_len == 0 || html.len() <= max_len {
        return false;
    }

    let mut end = max_len;
    while !html.is_char_boundary(end) {
        end -= 1;
    }

    tracing::debug!(original = html.len(), limit = max_len, kept = end, "truncating oversized HTML");
    html.truncate(end);
    true
}

//! The machine-view pipeline.
//!
//! [`MachineView`] runs the stages in order: narrow, sanitize, size guard,
//! convert, normalize. Only the converter can fail, and its failure is turned
//! into the [`FALLBACK_DOCUMENT`] here, so [`MachineView::render`] always
//! produces a non-empty Markdown document.
//!
//! # Example
//!
//! ```rust
//! use llms_txt_core::{MachineView, MachineViewConfig};
//!
//! let view = MachineView::new(MachineViewConfig::builder().selector("main").build());
//! let html = "<html><body><nav>Menu</nav><main><h1>Test Page</h1><p>Content here</p></main></body></html>";
//! let result = view.render(html);
//!
//! assert!(result.markdown.contains("Test Page"));
//! assert!(!result.markdown.contains("Menu"));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::LlmsTxtError;
use crate::classify::{IncomingRequest, is_machine_request};
use crate::config::MachineViewConfig;
use crate::convert::{ConverterOptions, MarkdownConverter, default_converter};
use crate::parse::Document;
use crate::postprocess::{FALLBACK_DOCUMENT, normalize_markdown};
use crate::preprocess::{enforce_size_limit, narrow_to_selector, strip_non_content_tags};

/// Deepest element nesting handed to the converter. Converters walk the tree
/// recursively, so deeper input is treated as a conversion failure instead of
/// risking a stack overflow.
pub const MAX_NESTING_DEPTH: usize = 256;

/// HTML after the preprocessing stages, ready for the converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedHtml {
    pub html: String,
    /// The size guard cut the HTML.
    pub truncated: bool,
}

/// Outcome of the converter stage.
#[derive(Debug)]
pub enum Conversion {
    /// Raw converter output, not yet normalized.
    Converted(String),
    /// Conversion produced nothing but whitespace.
    Empty,
    /// The converter reported an error or panicked.
    Failed(LlmsTxtError),
}

/// Output of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    /// Normalized Markdown, or the fallback document.
    pub markdown: String,
    pub truncated: bool,
    /// `markdown` is the fallback document.
    pub fallback: bool,
}

impl ConversionResult {
    fn fallback(truncated: bool) -> Self {
        Self { markdown: FALLBACK_DOCUMENT.to_string(), truncated, fallback: true }
    }
}

/// The HTML to Markdown pipeline, configured once and shared across requests.
#[derive(Clone)]
pub struct MachineView {
    config: MachineViewConfig,
    converter: Arc<dyn MarkdownConverter>,
}

impl MachineView {
    /// Creates a pipeline using the default converter.
    pub fn new(config: MachineViewConfig) -> Self {
        Self::with_converter(config, default_converter(ConverterOptions::default()))
    }

    /// Creates a pipeline around a custom converter.
    pub fn with_converter(config: MachineViewConfig, converter: Arc<dyn MarkdownConverter>) -> Self {
        Self { config, converter }
    }

    pub fn config(&self) -> &MachineViewConfig {
        &self.config
    }

    /// Whether `request` asks for the machine view. Always false when the
    /// machine view is disabled.
    pub fn wants_machine_view(&self, request: &IncomingRequest) -> bool {
        self.config.enabled && is_machine_request(request, self.config.trigger, &self.config.discovery_path)
    }

    /// Runs the narrow, sanitize and size-guard stages.
    pub fn prepare(&self, html: &str) -> PreparedHtml {
        let narrowed = narrow_to_selector(html, self.config.selector.as_deref()).into_html(html);
        let mut html = strip_non_content_tags(&narrowed);
        let truncated = enforce_size_limit(&mut html, self.config.max_html_length);
        PreparedHtml { html, truncated }
    }

    /// Runs the converter stage on prepared HTML.
    pub fn convert_prepared(&self, html: &str) -> Conversion {
        if Document::parse(html).exceeds_depth(MAX_NESTING_DEPTH) {
            return Conversion::Failed(LlmsTxtError::ConversionError(format!(
                "HTML nests deeper than {} levels",
                MAX_NESTING_DEPTH
            )));
        }

        match self.converter.convert(html) {
            Ok(markdown) if markdown.trim().is_empty() => Conversion::Empty,
            Ok(markdown) => Conversion::Converted(markdown),
            Err(e) => Conversion::Failed(e),
        }
    }

    /// Converts a full HTML page to its machine view. Never fails.
    pub fn render(&self, html: &str) -> ConversionResult {
        let prepared = self.prepare(html);

        match self.convert_prepared(&prepared.html) {
            Conversion::Converted(raw) => {
                let markdown = normalize_markdown(&raw, prepared.truncated);
                if markdown.is_empty() {
                    tracing::debug!("normalized markdown is empty, serving fallback document");
                    return ConversionResult::fallback(prepared.truncated);
                }
                ConversionResult { markdown, truncated: prepared.truncated, fallback: false }
            }
            Conversion::Empty => {
                tracing::debug!(bytes = prepared.html.len(), "conversion produced no content, serving fallback document");
                ConversionResult::fallback(prepared.truncated)
            }
            Conversion::Failed(e) => {
                tracing::warn!(error = %e, "markdown conversion failed, serving fallback document");
                ConversionResult::fallback(prepared.truncated)
            }
        }
    }
}

impl Default for MachineView {
    fn default() -> Self {
        Self::new(MachineViewConfig::default())
    }
}

impl fmt::Debug for MachineView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineView").field("config", &self.config).finish_non_exhaustive()
    }
}

/// Converts `html` to its machine view with `config` and the default
/// converter.
pub fn convert(html: &str, config: &MachineViewConfig) -> String {
    MachineView::new(config.clone()).render(html).markdown
}

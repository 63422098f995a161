//! The HTML to Markdown capability.
//!
//! [`MarkdownConverter`] is the seam between the pipeline and the conversion
//! library. The pipeline treats any `Err` from it as "serve the fallback
//! document", so implementations report failure instead of recovering.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};

use crate::Result;
#[cfg(feature = "markdown")]
use crate::LlmsTxtError;

static INLINE_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?)\[([^\]\n]+)\]\(([^)\s]+)\)").expect("inline link pattern is valid"));

/// Options passed to the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConverterOptions {
    /// Drop tags with no Markdown equivalent, keeping their text.
    pub strip_tags: bool,
    /// Write links whose text is their own absolute URL as `<url>`.
    pub autolinks: bool,
    /// Render `<br>` as a backslash break instead of two trailing spaces.
    pub hard_breaks: bool,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self { strip_tags: true, autolinks: true, hard_breaks: false }
    }
}

/// Converts an HTML fragment to Markdown text.
pub trait MarkdownConverter: Send + Sync {
    /// # Errors
    ///
    /// Returns [`crate::LlmsTxtError::ConversionError`] when the input cannot
    /// be converted.
    fn convert(&self, html: &str) -> Result<String>;
}

/// Converter backed by the `htmd` crate.
#[cfg(feature = "markdown")]
#[derive(Debug, Clone, Default)]
pub struct HtmdConverter {
    options: ConverterOptions,
}

#[cfg(feature = "markdown")]
impl HtmdConverter {
    pub fn new(options: ConverterOptions) -> Self {
        Self { options }
    }

    fn build(&self) -> htmd::HtmlToMarkdown {
        use htmd::options::{BrStyle, CodeBlockStyle, HeadingStyle, LinkStyle, Options, TranslationMode};

        let options = Options {
            heading_style: HeadingStyle::Atx,
            code_block_style: CodeBlockStyle::Fenced,
            link_style: LinkStyle::Inlined,
            br_style: if self.options.hard_breaks { BrStyle::Backslash } else { BrStyle::TwoSpaces },
            translation_mode: if self.options.strip_tags { TranslationMode::Pure } else { TranslationMode::Faithful },
            ..Default::default()
        };

        htmd::HtmlToMarkdown::builder().options(options).build()
    }
}

#[cfg(feature = "markdown")]
impl MarkdownConverter for HtmdConverter {
    fn convert(&self, html: &str) -> Result<String> {
        let converter = self.build();
        let converted = catch_unwind(AssertUnwindSafe(|| converter.convert(html)))
            .map_err(|panic| LlmsTxtError::ConversionError(panic_message(panic.as_ref())))?
            .map_err(|e| LlmsTxtError::ConversionError(e.to_string()))?;

        if self.options.autolinks { Ok(apply_autolinks(&converted)) } else { Ok(converted) }
    }
}

/// Fallback converter when the markdown feature is disabled: the document's
/// text content.
#[cfg(not(feature = "markdown"))]
#[derive(Debug, Clone, Default)]
pub struct TextConverter;

#[cfg(not(feature = "markdown"))]
impl MarkdownConverter for TextConverter {
    fn convert(&self, html: &str) -> Result<String> {
        let html = html.to_string();
        catch_unwind(AssertUnwindSafe(|| crate::parse::Document::parse(&html).text_content()))
            .map_err(|panic| crate::LlmsTxtError::ConversionError(panic_message(panic.as_ref())))
    }
}

/// The converter used when none is supplied.
#[cfg(feature = "markdown")]
pub fn default_converter(options: ConverterOptions) -> Arc<dyn MarkdownConverter> {
    Arc::new(HtmdConverter::new(options))
}

/// The converter used when none is supplied.
#[cfg(not(feature = "markdown"))]
pub fn default_converter(_options: ConverterOptions) -> Arc<dyn MarkdownConverter> {
    Arc::new(TextConverter)
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("converter panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("converter panicked: {}", s)
    } else {
        "converter panicked".to_string()
    }
}

/// Rewrites `[url](url)` as `<url>` for absolute URLs, outside code fences.
pub fn apply_autolinks(markdown: &str) -> String {
    let mut in_fence = false;
    markdown
        .split('\n')
        .map(|line| {
            if line.trim_start().starts_with("```") {
                in_fence = !in_fence;
                return line.to_string();
            }
            if in_fence {
                return line.to_string();
            }
            INLINE_LINK_RE
                .replace_all(line, |caps: &Captures| {
                    let (bang, text, url) = (&caps[1], &caps[2], &caps[3]);
                    if bang.is_empty() && text == url && is_absolute_url(url) {
                        format!("<{}>", url)
                    } else {
                        caps[0].to_string()
                    }
                })
                .into_owned()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_absolute_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://") || url.starts_with("mailto:")
}

pub mod cache;
pub mod classify;
pub mod config;
pub mod convert;
pub mod error;
pub mod fetch;
pub mod formatters;
pub mod machine_view;
pub mod parse;
pub mod postprocess;
pub mod preprocess;

pub use cache::{CacheConfig, CacheVisibility, etag};
pub use classify::{
    IncomingRequest, MARKDOWN_CONTENT_TYPE, MARKDOWN_MEDIA_TYPE, VIEW_HEADER, is_discovery_path, is_html_content_type,
    is_machine_request,
};
pub use config::{
    DEFAULT_MAX_HTML_LENGTH, DEFAULT_PATH, Link, LlmsTxtConfig, MachineViewConfig, MachineViewConfigBuilder, Preset,
    Section, TriggerMode, UseCase,
};
#[cfg(feature = "markdown")]
pub use convert::HtmdConverter;
pub use convert::{ConverterOptions, MarkdownConverter, default_converter};
pub use error::{LlmsTxtError, Result};
#[cfg(feature = "fetch")]
pub use fetch::fetch_url;
pub use fetch::{FetchConfig, FetchedPage, fetch_file, fetch_stdin};
pub use formatters::LlmsTxt;
pub use machine_view::{Conversion, ConversionResult, MAX_NESTING_DEPTH, MachineView, PreparedHtml, convert};
pub use parse::Document;
pub use postprocess::{FALLBACK_DOCUMENT, TRUNCATION_NOTICE, normalize_markdown};
#[doc(hidden)]
pub use preprocess::{NON_CONTENT_TAGS, Narrowing, enforce_size_limit, narrow_to_selector, strip_non_content_tags};

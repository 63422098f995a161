pub mod llms_txt;

pub use llms_txt::{DEFAULT_TITLE, LlmsTxt, escape_markdown, write};

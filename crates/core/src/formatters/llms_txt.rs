//! The `llms.txt` discovery document writer.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{LlmsTxtConfig, Section};

/// Title used when neither the config nor `APP_NAME` provides one.
pub const DEFAULT_TITLE: &str = "Web Application";

static MARKDOWN_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]\(.*?\)").expect("markdown link pattern is valid"));

/// A discovery document with the use case preset already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmsTxt {
    pub title: String,
    pub description: String,
    pub body: Option<String>,
    pub sections: Vec<Section>,
}

impl LlmsTxt {
    /// Builds the document from `config`, falling back to `APP_NAME` for the
    /// title.
    pub fn from_config(config: &LlmsTxtConfig) -> Self {
        Self::from_config_with_app_name(config, std::env::var("APP_NAME").ok().as_deref())
    }

    /// Merges the preset selected by `config.use_case` into `config`.
    ///
    /// Non-empty preset fields replace the configured ones. Preset sections
    /// come first; a configured section with the same name replaces the
    /// preset's links in place, others are appended in order.
    pub fn from_config_with_app_name(config: &LlmsTxtConfig, app_name: Option<&str>) -> Self {
        let preset = config.use_case.preset();

        let title = preset
            .title
            .or_else(|| config.title.clone())
            .filter(|t| !t.is_empty())
            .or_else(|| app_name.filter(|n| !n.is_empty()).map(str::to_string))
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let description = preset.description.unwrap_or_else(|| config.description.clone());
        let body = preset.body.or_else(|| config.body.clone());

        let mut sections: Vec<Section> = preset.sections.iter().map(|name| Section::new(*name, Vec::new())).collect();
        for section in &config.sections {
            match sections.iter_mut().find(|s| s.name == section.name) {
                Some(existing) => existing.links = section.links.clone(),
                None => sections.push(section.clone()),
            }
        }

        Self { title, description, body, sections }
    }

    pub fn render(&self) -> String {
        write(&self.title, &self.description, self.body.as_deref(), &self.sections)
    }

    /// Renders the discovery document for `config`.
    pub fn generate(config: &LlmsTxtConfig) -> String {
        let document = Self::from_config(config);
        tracing::info!(title = %document.title, sections = document.sections.len(), "generated llms.txt");
        document.render()
    }
}

/// Writes a discovery document.
///
/// Sections without links are skipped, as are links missing a title or URL.
pub fn write(title: &str, description: &str, body: Option<&str>, sections: &[Section]) -> String {
    let mut lines: Vec<String> = vec![
        format!("# {}", escape_markdown(title)),
        String::new(),
        format!("> {}", escape_markdown(description)),
        String::new(),
    ];

    if let Some(body) = body.filter(|b| !b.is_empty()) {
        lines.push(body.to_string());
        lines.push(String::new());
    }

    for section in sections.iter().filter(|s| !s.links.is_empty()) {
        let heading = if section.name.eq_ignore_ascii_case("optional") { "Optional" } else { &section.name };
        lines.push(format!("## {}", escape_markdown(heading)));
        lines.push(String::new());

        for link in &section.links {
            if link.title.is_empty() || link.url.is_empty() {
                continue;
            }

            let mut line = format!("- [{}]({})", escape_markdown(&link.title), link.url);
            if let Some(notes) = link.notes.as_deref().filter(|n| !n.is_empty()) {
                line.push_str(": ");
                line.push_str(&escape_markdown(notes));
            }
            lines.push(line);
        }

        lines.push(String::new());
    }

    lines.join("\n")
}

/// Escapes backticks unless `text` already contains a Markdown link.
pub fn escape_markdown(text: &str) -> String {
    if MARKDOWN_LINK_RE.is_match(text) { text.to_string() } else { text.replace('`', "\\`") }
}

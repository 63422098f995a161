//! Configuration for the discovery document and the machine view.
//!
//! [`LlmsTxtConfig`] is the flat, serde-friendly configuration surface. Its
//! keys mirror the `LLMS_TXT_*` environment variables so a JSON file and the
//! environment can be layered on top of each other. The pipeline never reads
//! it directly: it receives the derived [`MachineViewConfig`] and
//! [`CacheConfig`] values instead.
//!
//! # Example
//!
//! ```rust
//! use llms_txt_core::{LlmsTxtConfig, TriggerMode};
//!
//! let mut config = LlmsTxtConfig::default();
//! config.apply_env_overrides(|key| match key {
//!     "LLMS_TXT_MACHINE_VIEW_TRIGGER" => Some("accept".to_string()),
//!     _ => None,
//! })?;
//! assert_eq!(config.machine_view().trigger, TriggerMode::Accept);
//! # Ok::<(), llms_txt_core::LlmsTxtError>(())
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::{CacheConfig, CacheVisibility};
use crate::{LlmsTxtError, Result};

/// Default route path of the discovery document.
pub const DEFAULT_PATH: &str = "llms.txt";

/// Default byte budget for HTML handed to the converter.
pub const DEFAULT_MAX_HTML_LENGTH: usize = 500_000;

/// File name looked up in the working directory by [`LlmsTxtConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "llms-txt.json";

/// Which request signals count as asking for the machine view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    /// `?view=machine` or `?format=markdown`.
    Query,
    /// `Accept` header containing `text/markdown`.
    Accept,
    /// `X-View: machine`.
    Header,
    /// Any of the above.
    #[default]
    All,
}

impl TriggerMode {
    pub fn checks_query(self) -> bool {
        matches!(self, Self::Query | Self::All)
    }

    pub fn checks_accept(self) -> bool {
        matches!(self, Self::Accept | Self::All)
    }

    pub fn checks_header(self) -> bool {
        matches!(self, Self::Header | Self::All)
    }
}

impl FromStr for TriggerMode {
    type Err = LlmsTxtError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "query" => Ok(Self::Query),
            "accept" => Ok(Self::Accept),
            "header" => Ok(Self::Header),
            "all" => Ok(Self::All),
            _ => Err(LlmsTxtError::InvalidTrigger(s.to_string())),
        }
    }
}

impl fmt::Display for TriggerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Query => "query",
            Self::Accept => "accept",
            Self::Header => "header",
            Self::All => "all",
        };
        f.write_str(name)
    }
}

/// Use case preset applied on top of the configured discovery document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UseCase {
    Docs,
    Business,
    Ecommerce,
    Education,
    Legislation,
    #[default]
    Custom,
}

impl FromStr for UseCase {
    type Err = LlmsTxtError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "docs" => Ok(Self::Docs),
            "business" => Ok(Self::Business),
            "ecommerce" => Ok(Self::Ecommerce),
            "education" => Ok(Self::Education),
            "legislation" => Ok(Self::Legislation),
            "custom" => Ok(Self::Custom),
            other => Err(LlmsTxtError::ConfigError(format!("Unknown use case: {}", other))),
        }
    }
}

/// Default structure contributed by a [`UseCase`].
///
/// `None` fields leave the main configuration untouched.
#[derive(Debug, Clone, Default)]
pub struct Preset {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    /// Section names, in order, each starting with no links.
    pub sections: Vec<&'static str>,
}

impl UseCase {
    /// Returns the preset for this use case.
    pub fn preset(self) -> Preset {
        let (description, sections): (&str, Vec<&'static str>) = match self {
            Self::Docs => (
                "Documentation and API for LLMs and IDEs.",
                vec!["Getting Started", "API Reference", "Optional"],
            ),
            Self::Business => (
                "Company/personal website with structure, policies, and contact information.",
                vec!["About", "Policies", "Contact", "Optional"],
            ),
            Self::Ecommerce => (
                "E-commerce site with products, policies, shipping, returns, and support information.",
                vec!["Products", "Policies", "Support", "Optional"],
            ),
            Self::Education => (
                "Educational platform with courses, resources, and learning materials.",
                vec!["Courses", "Resources", "Optional"],
            ),
            Self::Legislation => (
                "Structured overview of legislation for stakeholders.",
                vec!["Overview", "Sections", "Optional"],
            ),
            Self::Custom => return Preset::default(),
        };

        Preset { title: None, description: Some(description.to_string()), body: None, sections }
    }
}

/// A single link in a discovery document section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Link {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self { title: title.into(), url: url.into(), notes: None }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// A named `##` section of the discovery document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Section {
    pub fn new(name: impl Into<String>, links: Vec<Link>) -> Self {
        Self { name: name.into(), links }
    }
}

/// Complete configuration surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmsTxtConfig {
    /// Serve the discovery document at all.
    pub enabled: bool,
    /// Route path of the discovery document, without a leading slash.
    pub path: String,
    pub use_case: UseCase,
    pub title: Option<String>,
    pub description: String,
    pub body: Option<String>,
    pub sections: Vec<Section>,
    /// Attach `Link: <...>; rel="llms-txt"` to every response.
    pub add_link_header: bool,
    /// Absolute base URL used for the Link header.
    pub app_url: Option<String>,
    pub machine_view_enabled: bool,
    /// Route `<path>.md` to the machine view of `<path>`.
    pub md_extension_enabled: bool,
    pub machine_view_trigger: TriggerMode,
    /// CSS selector of the main content. `None` converts the whole page.
    pub main_content_selector: Option<String>,
    /// Byte budget for HTML handed to the converter (0 = unlimited).
    pub machine_view_max_html_length: usize,
    pub cache_enabled: bool,
    pub cache_max_age: u64,
    pub cache_visibility: CacheVisibility,
    pub cache_etag: bool,
}

impl Default for LlmsTxtConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: DEFAULT_PATH.to_string(),
            use_case: UseCase::Custom,
            title: None,
            description: String::new(),
            body: None,
            sections: Vec::new(),
            add_link_header: false,
            app_url: None,
            machine_view_enabled: true,
            md_extension_enabled: true,
            machine_view_trigger: TriggerMode::All,
            main_content_selector: Some("main".to_string()),
            machine_view_max_html_length: DEFAULT_MAX_HTML_LENGTH,
            cache_enabled: true,
            cache_max_age: 3600,
            cache_visibility: CacheVisibility::Public,
            cache_etag: false,
        }
    }
}

impl LlmsTxtConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// Missing keys take their default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LlmsTxtError::FileNotFound(path.to_path_buf()));
        }

        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| LlmsTxtError::ConfigError(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), "loaded llms.txt configuration");
        Ok(config.normalized())
    }

    /// Finds and loads the first configuration file that exists.
    ///
    /// Looks for `./llms-txt.json`, then `<config dir>/llms-txt/config.json`.
    /// Falls back to defaults when neither exists.
    pub fn discover() -> Result<Self> {
        for candidate in Self::candidate_paths() {
            if candidate.exists() {
                return Self::load(candidate);
            }
        }
        Ok(Self::default())
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("llms-txt").join("config.json"));
        }
        paths
    }

    /// Reads `LLMS_TXT_*` overrides from the process environment.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        self.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(self)
    }

    /// Layers `LLMS_TXT_*` overrides from `lookup` on top of this config.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("LLMS_TXT_ENABLED") {
            self.enabled = parse_bool("LLMS_TXT_ENABLED", &v)?;
        }
        if let Some(v) = lookup("LLMS_TXT_PATH") {
            self.path = v;
        }
        if let Some(v) = lookup("LLMS_TXT_USE_CASE") {
            self.use_case = v.parse()?;
        }
        if let Some(v) = lookup("LLMS_TXT_TITLE") {
            self.title = Some(v);
        }
        if let Some(v) = lookup("LLMS_TXT_DESCRIPTION") {
            self.description = v;
        }
        if let Some(v) = lookup("LLMS_TXT_BODY") {
            self.body = Some(v);
        }
        if let Some(v) = lookup("LLMS_TXT_ADD_LINK_HEADER") {
            self.add_link_header = parse_bool("LLMS_TXT_ADD_LINK_HEADER", &v)?;
        }
        if let Some(v) = lookup("LLMS_TXT_APP_URL") {
            self.app_url = Some(v);
        }
        if let Some(v) = lookup("LLMS_TXT_MACHINE_VIEW_ENABLED") {
            self.machine_view_enabled = parse_bool("LLMS_TXT_MACHINE_VIEW_ENABLED", &v)?;
        }
        if let Some(v) = lookup("LLMS_TXT_MD_EXTENSION_ENABLED") {
            self.md_extension_enabled = parse_bool("LLMS_TXT_MD_EXTENSION_ENABLED", &v)?;
        }
        if let Some(v) = lookup("LLMS_TXT_MACHINE_VIEW_TRIGGER") {
            self.machine_view_trigger = v.parse()?;
        }
        if let Some(v) = lookup("LLMS_TXT_MAIN_CONTENT_SELECTOR") {
            self.main_content_selector = Some(v);
        }
        if let Some(v) = lookup("LLMS_TXT_MACHINE_VIEW_MAX_HTML_LENGTH") {
            self.machine_view_max_html_length = parse_number("LLMS_TXT_MACHINE_VIEW_MAX_HTML_LENGTH", &v)?;
        }
        if let Some(v) = lookup("LLMS_TXT_CACHE_ENABLED") {
            self.cache_enabled = parse_bool("LLMS_TXT_CACHE_ENABLED", &v)?;
        }
        if let Some(v) = lookup("LLMS_TXT_CACHE_MAX_AGE") {
            self.cache_max_age = parse_number("LLMS_TXT_CACHE_MAX_AGE", &v)?;
        }
        if let Some(v) = lookup("LLMS_TXT_CACHE_VISIBILITY") {
            self.cache_visibility = v.parse()?;
        }
        if let Some(v) = lookup("LLMS_TXT_CACHE_ETAG") {
            self.cache_etag = parse_bool("LLMS_TXT_CACHE_ETAG", &v)?;
        }

        *self = std::mem::take(self).normalized();
        Ok(())
    }

    /// Strips slashes from `path` and turns a blank selector into `None`.
    fn normalized(mut self) -> Self {
        self.path = self.path.trim_matches('/').to_string();
        if self.path.is_empty() {
            self.path = DEFAULT_PATH.to_string();
        }
        self.main_content_selector = self
            .main_content_selector
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }

    /// The pipeline view of this configuration.
    pub fn machine_view(&self) -> MachineViewConfig {
        MachineViewConfig {
            enabled: self.machine_view_enabled,
            md_extension_enabled: self.md_extension_enabled,
            trigger: self.machine_view_trigger,
            selector: self.main_content_selector.clone(),
            max_html_length: self.machine_view_max_html_length,
            discovery_path: self.path.clone(),
        }
    }

    /// Cache headers applied to Markdown responses, or `None` when disabled.
    pub fn cache(&self) -> Option<CacheConfig> {
        self.cache_enabled.then(|| CacheConfig {
            max_age: self.cache_max_age,
            visibility: self.cache_visibility,
            etag: self.cache_etag,
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(LlmsTxtError::ConfigError(format!("{}: expected a boolean, got {:?}", key, other))),
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| LlmsTxtError::ConfigError(format!("{}: expected a non-negative integer, got {:?}", key, value)))
}

/// Immutable configuration threaded into the machine-view pipeline.
///
/// # Example
///
/// ```rust
/// use llms_txt_core::{MachineViewConfig, TriggerMode};
///
/// let config = MachineViewConfig::builder()
///     .trigger(TriggerMode::Query)
///     .selector("article")
///     .max_html_length(10_000)
///     .build();
/// assert_eq!(config.selector.as_deref(), Some("article"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineViewConfig {
    pub enabled: bool,
    pub md_extension_enabled: bool,
    pub trigger: TriggerMode,
    pub selector: Option<String>,
    /// 0 = unlimited.
    pub max_html_length: usize,
    /// Discovery document path, without a leading slash.
    pub discovery_path: String,
}

impl Default for MachineViewConfig {
    fn default() -> Self {
        LlmsTxtConfig::default().machine_view()
    }
}

impl MachineViewConfig {
    pub fn builder() -> MachineViewConfigBuilder {
        MachineViewConfigBuilder::new()
    }
}

/// Builder for MachineViewConfig.
pub struct MachineViewConfigBuilder {
    config: MachineViewConfig,
}

impl MachineViewConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: MachineViewConfig::default() }
    }

    pub fn enabled(mut self, value: bool) -> Self {
        self.config.enabled = value;
        self
    }

    pub fn md_extension_enabled(mut self, value: bool) -> Self {
        self.config.md_extension_enabled = value;
        self
    }

    pub fn trigger(mut self, value: TriggerMode) -> Self {
        self.config.trigger = value;
        self
    }

    /// Sets the main content selector.
    pub fn selector(mut self, value: impl Into<String>) -> Self {
        self.config.selector = Some(value.into());
        self
    }

    /// Converts the whole page instead of a selected sub-tree.
    pub fn no_selector(mut self) -> Self {
        self.config.selector = None;
        self
    }

    pub fn max_html_length(mut self, value: usize) -> Self {
        self.config.max_html_length = value;
        self
    }

    pub fn discovery_path(mut self, value: impl Into<String>) -> Self {
        self.config.discovery_path = value.into().trim_matches('/').to_string();
        self
    }

    /// Builds the config.
    pub fn build(self) -> MachineViewConfig {
        self.config
    }
}

impl Default for MachineViewConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = LlmsTxtConfig::default();
        assert!(config.enabled);
        assert_eq!(config.path, "llms.txt");
        assert_eq!(config.machine_view_trigger, TriggerMode::All);
        assert_eq!(config.main_content_selector.as_deref(), Some("main"));
        assert_eq!(config.machine_view_max_html_length, 500_000);
        assert_eq!(config.cache_max_age, 3600);
        assert!(!config.cache_etag);
    }

    #[test]
    fn test_trigger_mode_from_str() {
        assert_eq!("query".parse::<TriggerMode>().unwrap(), TriggerMode::Query);
        assert_eq!("ACCEPT".parse::<TriggerMode>().unwrap(), TriggerMode::Accept);
        assert_eq!(" header ".parse::<TriggerMode>().unwrap(), TriggerMode::Header);
        assert_eq!("all".parse::<TriggerMode>().unwrap(), TriggerMode::All);
        assert!(matches!(
            "never".parse::<TriggerMode>(),
            Err(LlmsTxtError::InvalidTrigger(_))
        ));
    }

    #[test]
    fn test_trigger_mode_checks() {
        assert!(TriggerMode::Query.checks_query());
        assert!(!TriggerMode::Query.checks_accept());
        assert!(!TriggerMode::Accept.checks_header());
        assert!(TriggerMode::All.checks_query() && TriggerMode::All.checks_accept() && TriggerMode::All.checks_header());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = LlmsTxtConfig::default();
        config
            .apply_env_overrides(lookup_from(&[
                ("LLMS_TXT_PATH", "/ai/llms.txt"),
                ("LLMS_TXT_MACHINE_VIEW_TRIGGER", "header"),
                ("LLMS_TXT_MACHINE_VIEW_MAX_HTML_LENGTH", "1024"),
                ("LLMS_TXT_CACHE_ETAG", "true"),
                ("LLMS_TXT_CACHE_VISIBILITY", "private"),
                ("LLMS_TXT_USE_CASE", "docs"),
            ]))
            .unwrap();

        assert_eq!(config.path, "ai/llms.txt");
        assert_eq!(config.machine_view_trigger, TriggerMode::Header);
        assert_eq!(config.machine_view_max_html_length, 1024);
        assert!(config.cache_etag);
        assert_eq!(config.cache_visibility, CacheVisibility::Private);
        assert_eq!(config.use_case, UseCase::Docs);
    }

    #[test]
    fn test_empty_selector_override_disables_narrowing() {
        let mut config = LlmsTxtConfig::default();
        config
            .apply_env_overrides(lookup_from(&[("LLMS_TXT_MAIN_CONTENT_SELECTOR", "")]))
            .unwrap();
        assert_eq!(config.main_content_selector, None);
        assert_eq!(config.machine_view().selector, None);
    }

    #[test]
    fn test_invalid_override_is_error() {
        let mut config = LlmsTxtConfig::default();
        let result = config.apply_env_overrides(lookup_from(&[("LLMS_TXT_CACHE_MAX_AGE", "-5")]));
        assert!(matches!(result, Err(LlmsTxtError::ConfigError(_))));

        let result = config.apply_env_overrides(lookup_from(&[("LLMS_TXT_ENABLED", "maybe")]));
        assert!(matches!(result, Err(LlmsTxtError::ConfigError(_))));
    }

    #[test]
    fn test_deserialize_partial_json() {
        let config: LlmsTxtConfig = serde_json::from_str(
            r#"{
                "title": "Acme",
                "machine_view_trigger": "query",
                "sections": [
                    {"name": "Docs", "links": [{"title": "Start", "url": "/start", "notes": "Begin here"}]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.title.as_deref(), Some("Acme"));
        assert_eq!(config.machine_view_trigger, TriggerMode::Query);
        assert_eq!(config.sections.len(), 1);
        assert_eq!(config.sections[0].links[0].notes.as_deref(), Some("Begin here"));
        assert!(config.machine_view_enabled);
    }

    #[test]
    fn test_cache_view() {
        let mut config = LlmsTxtConfig::default();
        let cache = config.cache().unwrap();
        assert_eq!(cache.max_age, 3600);
        assert_eq!(cache.visibility, CacheVisibility::Public);

        config.cache_enabled = false;
        assert!(config.cache().is_none());
    }

    #[test]
    fn test_machine_view_builder() {
        let config = MachineViewConfig::builder()
            .trigger(TriggerMode::Query)
            .no_selector()
            .max_html_length(0)
            .discovery_path("/robots/llms.txt")
            .build();

        assert_eq!(config.trigger, TriggerMode::Query);
        assert_eq!(config.selector, None);
        assert_eq!(config.max_html_length, 0);
        assert_eq!(config.discovery_path, "robots/llms.txt");
    }

    #[test]
    fn test_presets() {
        let docs = UseCase::Docs.preset();
        assert_eq!(docs.sections, vec!["Getting Started", "API Reference", "Optional"]);
        assert!(docs.description.is_some());

        let custom = UseCase::Custom.preset();
        assert!(custom.sections.is_empty());
        assert!(custom.description.is_none());
    }
}

//! Content fetching from URLs, files, and stdin.
//!
//! This module provides functions for retrieving pages to convert from
//! various sources: HTTP/HTTPS URLs, local files, and standard input. URL
//! fetching needs the `fetch` feature.

use std::fs;
use std::path::PathBuf;
#[cfg(feature = "fetch")]
use std::time::Duration;

#[cfg(feature = "fetch")]
use reqwest::Client;
#[cfg(feature = "fetch")]
use url::Url;

use crate::classify::is_html_content_type;
use crate::{LlmsTxtError, Result};

/// HTTP client configuration for fetching web pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout: 30, user_agent: "Mozilla/5.0 (compatible; llms-txt/0.1; machine-view)".to_string() }
    }
}

/// A fetched page with the response metadata the pipeline looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub body: String,
    /// `Content-Type` of the response, empty when absent.
    pub content_type: String,
    pub status: u16,
}

impl FetchedPage {
    /// A local document, assumed to be HTML.
    pub fn local(body: String) -> Self {
        Self { body, content_type: "text/html".to_string(), status: 200 }
    }

    pub fn is_html(&self) -> bool {
        is_html_content_type(&self.content_type)
    }
}

/// Fetches a page from a URL.
///
/// Follows redirects and respects the configured timeout. The request asks
/// for HTML so the server does not negotiate a Markdown view on its own.
#[cfg(feature = "fetch")]
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<FetchedPage> {
    let parsed_url = Url::parse(url).map_err(|e| LlmsTxtError::InvalidUrl(e.to_string()))?;

    if !matches!(parsed_url.scheme(), "http" | "https") {
        return Err(LlmsTxtError::InvalidUrl(format!(
            "unsupported scheme {:?} (expected http or https)",
            parsed_url.scheme()
        )));
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(LlmsTxtError::HttpError)?;

    let response = client
        .get(parsed_url)
        .header("User-Agent", &config.user_agent)
        .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() { LlmsTxtError::Timeout { timeout: config.timeout } } else { LlmsTxtError::HttpError(e) }
        })?;

    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = response.text().await?;

    tracing::debug!(url, status, content_type = %content_type, bytes = body.len(), "fetched page");
    Ok(FetchedPage { body, content_type, status })
}

/// Reads HTML content from a local file.
///
/// Callers should validate and sanitize the path when accepting user input.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(LlmsTxtError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(LlmsTxtError::from)
    }
}

/// Reads HTML content from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(LlmsTxtError::from)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, 30);
        assert!(config.user_agent.contains("llms-txt"));
    }

    #[cfg(feature = "fetch")]
    #[test]
    fn test_fetch_url_invalid() {
        let config = FetchConfig::default();
        let result = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            runtime.block_on(fetch_url("not-a-url", &config))
        })
        .join()
        .unwrap();

        assert!(matches!(result, Err(LlmsTxtError::InvalidUrl(_))));
    }

    #[cfg(feature = "fetch")]
    #[test]
    fn test_fetch_url_rejects_non_http_scheme() {
        let config = FetchConfig::default();
        let result = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            runtime.block_on(fetch_url("ftp://example.com/page", &config))
        })
        .join()
        .unwrap();

        assert!(matches!(result, Err(LlmsTxtError::InvalidUrl(_))));
    }

    #[test]
    fn test_fetch_file_not_found() {
        let result = fetch_file("/nonexistent/path/file.html");
        assert!(matches!(result, Err(LlmsTxtError::FileNotFound(_))));
    }

    #[test]
    fn test_fetch_file_reads_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<p>hello</p>").unwrap();

        assert_eq!(fetch_file(path.to_str().unwrap()).unwrap(), "<p>hello</p>");
    }

    #[test]
    fn test_fetch_file_read_failure_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = fetch_file(dir.path().to_str().unwrap());

        assert!(matches!(result, Err(LlmsTxtError::IoError(_))));
    }

    #[test]
    fn test_local_page_is_html() {
        let page = FetchedPage::local("<p>x</p>".to_string());
        assert!(page.is_html());
        assert_eq!(page.status, 200);

        let json = FetchedPage { body: "{}".to_string(), content_type: "application/json".to_string(), status: 200 };
        assert!(!json.is_html());
    }
}

//! Cache-Control and ETag values for Markdown responses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{LlmsTxtError, Result};

/// `public` or `private` cache visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheVisibility {
    #[default]
    Public,
    Private,
}

impl FromStr for CacheVisibility {
    type Err = LlmsTxtError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            other => Err(LlmsTxtError::ConfigError(format!(
                "Unknown cache visibility: {} (expected public or private)",
                other
            ))),
        }
    }
}

impl fmt::Display for CacheVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("public"),
            Self::Private => f.write_str("private"),
        }
    }
}

/// Cache headers attached to generated Markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// `max-age` in seconds.
    pub max_age: u64,
    pub visibility: CacheVisibility,
    /// Emit a content-derived `ETag`.
    pub etag: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_age: 3600, visibility: CacheVisibility::Public, etag: false }
    }
}

impl CacheConfig {
    /// Value of the `Cache-Control` header.
    pub fn cache_control(&self) -> String {
        format!("{}, max-age={}", self.visibility, self.max_age)
    }

    /// Quoted `ETag` value for `body`, or `None` when ETags are disabled.
    pub fn etag_for(&self, body: &str) -> Option<String> {
        self.etag.then(|| etag(body))
    }

    /// `(name, value)` pairs to set on a response carrying `body`.
    pub fn headers_for(&self, body: &str) -> Vec<(&'static str, String)> {
        let mut headers = vec![("cache-control", self.cache_control())];
        if let Some(tag) = self.etag_for(body) {
            headers.push(("etag", tag));
        }
        headers
    }
}

/// Strong ETag of `body`: its SHA-256 digest in lowercase hex, quoted.
pub fn etag(body: &str) -> String {
    let digest = Sha256::digest(body.as_bytes());
    format!("\"{:x}\"", digest)
}

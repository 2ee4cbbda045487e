//! Client configuration: default option values and transport settings.
//!
//! Every field has a default, so a TOML file only needs the keys it changes:
//!
//! ```toml
//! token = "abc123"
//! private = true
//! timeout_ms = 30000
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Production endpoint of the Crocodoc API.
pub const API_URL: &str = "https://crocodoc.com/api/v1";

pub const ENV_TOKEN: &str = "CROCODOC_TOKEN";
pub const ENV_BASE_URL: &str = "CROCODOC_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "CROCODOC_TIMEOUT_MS";

/// Defaults merged under every call's options, plus transport settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API token sent with every request.
    pub token: String,
    /// Upload returns before conversion begins.
    #[serde(rename = "async")]
    pub async_: bool,
    /// Private documents are only reachable by the owner or via sessions.
    pub private: bool,
    /// Downloads include annotations.
    pub annotated: bool,
    /// Viewers may mark up the document (share and session).
    pub editable: bool,
    /// Session users may download the document.
    pub downloadable: bool,
    pub base_url: String,
    /// Request timeout in milliseconds; `None` leaves the transport default
    /// in place. Zero is rejected when loading.
    pub timeout_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: String::new(),
            async_: false,
            private: false,
            annotated: false,
            editable: true,
            downloadable: true,
            base_url: API_URL.to_string(),
            timeout_ms: None,
        }
    }
}

// The token never appears in logs or panic messages.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token_set", &!self.token.is_empty())
            .field("async", &self.async_)
            .field("private", &self.private)
            .field("annotated", &self.annotated)
            .field("editable", &self.editable)
            .field("downloadable", &self.downloadable)
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl Config {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Set the request timeout. Sub-millisecond remainders round up, and a
    /// zero duration clears the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000);
        self.timeout_ms = match millis {
            0 => None,
            n => Some(u64::try_from(n).unwrap_or(u64::MAX)),
        };
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    /// Base URL without trailing slashes.
    pub fn api_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ApiError> {
        let cfg: Config =
            toml::from_str(raw).map_err(|e| ApiError::Config(format!("parsing TOML: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self, ApiError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ApiError::Config(format!("reading {}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// Build a config from `CROCODOC_TOKEN`, `CROCODOC_BASE_URL` and
    /// `CROCODOC_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(ENV_TOKEN)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Config(format!("{ENV_TOKEN} is not set")))?;
        let mut cfg = Self::new(token);
        if let Some(url) = lookup(ENV_BASE_URL) {
            cfg.base_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            let ms = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ApiError::Config(format!("{ENV_TIMEOUT_MS} is not a number: {raw}")))?;
            cfg.timeout_ms = Some(ms);
        }
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ApiError> {
        if self.timeout_ms == Some(0) {
            return Err(ApiError::Config(
                "timeout must be greater than zero; leave it unset for the transport default".into(),
            ));
        }
        Ok(())
    }
}

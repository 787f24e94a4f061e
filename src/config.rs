use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const STORAGE_URL_VAR: &str = "SUPABASE_URL";
pub const STORAGE_KEY_VAR: &str = "SUPABASE_KEY";
pub const NEWS_API_KEY_VAR: &str = "NEWS_API_KEY";
pub const BIND_ADDRESS_VAR: &str = "BIND_ADDRESS";
pub const CONFIG_PATH_VAR: &str = "TECHNEWS_CONFIG";

pub const DEFAULT_CONFIG_PATH: &str = "technews.toml";

/// Process settings, resolved once by an entry point and injected.
///
/// Secrets are optional here so the server can start without them; the
/// pipeline and query service check for them on every call.
#[derive(Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    /// Top-headlines endpoint of the news API
    #[serde(default = "default_news_api_url")]
    pub news_api_url: String,
    #[serde(default)]
    pub storage_url: Option<String>,
    #[serde(default)]
    pub storage_key: Option<String>,
    #[serde(default)]
    pub news_api_key: Option<String>,
}

fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_news_api_url() -> String {
    "https://newsapi.org/v2/top-headlines".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub url: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    pub storage: StorageConfig,
    pub news_api_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            static_dir: default_static_dir(),
            news_api_url: default_news_api_url(),
            storage_url: None,
            storage_key: None,
            news_api_key: None,
        }
    }
}

impl Settings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_str(&content)
    }

    /// Parse settings from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Settings for an entry point: the config file when present, then the
    /// process environment on top.
    pub fn resolve() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let settings = if Path::new(&path).exists() {
            Self::load(&path)?
        } else {
            Self::default()
        };
        Ok(settings.with_env(|name| std::env::var(name).ok()))
    }

    /// Overlay values from `lookup`; unset and empty variables leave the
    /// current value alone.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(url) = get(STORAGE_URL_VAR) {
            self.storage_url = Some(url);
        }
        if let Some(key) = get(STORAGE_KEY_VAR) {
            self.storage_key = Some(key);
        }
        if let Some(key) = get(NEWS_API_KEY_VAR) {
            self.news_api_key = Some(key);
        }
        if let Some(addr) = get(BIND_ADDRESS_VAR) {
            self.bind_address = addr;
        }
        self
    }

    pub fn storage_config(&self) -> Result<StorageConfig, ConfigError> {
        let url = present(&self.storage_url);
        let key = present(&self.storage_key);
        match (url, key) {
            (Some(url), Some(key)) => Ok(StorageConfig {
                url: url.to_string(),
                key: key.to_string(),
            }),
            _ => Err(ConfigError::Missing(missing(&[
                (STORAGE_URL_VAR, url.is_none()),
                (STORAGE_KEY_VAR, key.is_none()),
            ]))),
        }
    }

    /// All three values the ingestion pipeline needs, or every one that is missing.
    pub fn ingest_config(&self) -> Result<IngestConfig, ConfigError> {
        let url = present(&self.storage_url);
        let key = present(&self.storage_key);
        let news_api_key = present(&self.news_api_key);
        match (url, key, news_api_key) {
            (Some(url), Some(key), Some(news_api_key)) => Ok(IngestConfig {
                storage: StorageConfig {
                    url: url.to_string(),
                    key: key.to_string(),
                },
                news_api_key: news_api_key.to_string(),
            }),
            _ => Err(ConfigError::Missing(missing(&[
                (STORAGE_URL_VAR, url.is_none()),
                (STORAGE_KEY_VAR, key.is_none()),
                (NEWS_API_KEY_VAR, news_api_key.is_none()),
            ]))),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn missing(checks: &[(&'static str, bool)]) -> Vec<&'static str> {
    checks
        .iter()
        .filter(|(_, absent)| *absent)
        .map(|(name, _)| *name)
        .collect()
}

fn redact(value: &Option<String>) -> &'static str {
    match value {
        Some(_) => "<redacted>",
        None => "<unset>",
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("bind_address", &self.bind_address)
            .field("static_dir", &self.static_dir)
            .field("news_api_url", &self.news_api_url)
            .field("storage_url", &self.storage_url)
            .field("storage_key", &redact(&self.storage_key))
            .field("news_api_key", &redact(&self.news_api_key))
            .finish()
    }
}

//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! where the API lives, which origin the client is served from, the client
//! identifier sent with every request, and where the session is stored.
//!
//! Configuration is stored at `~/.config/studyhub/config.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "studyhub";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Direct service address used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/v1";

/// Path the development server proxies to the API.
pub const PROXY_PATH: &str = "/api/v1";

/// Origins served by the development server, which proxies the API.
pub const DEV_ORIGINS: &[&str] = &["localhost:4000", "127.0.0.1:4000"];

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "STUDYHUB_API_URL";
pub const ENV_SERVED_FROM: &str = "STUDYHUB_SERVED_FROM";
pub const ENV_CLIENT_ID: &str = "STUDYHUB_CLIENT_ID";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON file in the cache directory
    #[default]
    File,
    /// OS keychain
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Direct service address, including the version path.
    pub api_url: Option<String>,
    /// Origin this client is served from (`http://localhost:4000`), if any.
    pub served_from: Option<String>,
    /// Sent as `X-Client-ID` on every authenticated request.
    pub client_id: Option<String>,
    pub request_timeout_secs: u64,
    pub storage: StorageBackend,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            served_from: None,
            client_id: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            storage: StorageBackend::File,
            last_email: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Write this value as the config file. Callers holding a value with
    /// environment or command-line overrides applied want `remember_email`.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Record the last login email in the file on disk. Only that field
    /// changes; overrides applied to an in-memory `Config` never reach the file.
    pub fn remember_email(email: &str) -> Result<()> {
        Self::remember_email_at(&Self::config_path()?, email)
    }

    fn remember_email_at(path: &Path, email: &str) -> Result<()> {
        let mut on_disk = Self::load_from(path)?;
        on_disk.last_email = Some(email.to_string());
        on_disk.save_to(path)
    }

    /// Overlay `STUDYHUB_*` environment variables on top of the file values.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_empty(ENV_API_URL) {
            debug!(api_url = %url, "API URL overridden from environment");
            self.api_url = Some(url);
        }
        if let Some(origin) = non_empty(ENV_SERVED_FROM) {
            self.served_from = Some(origin);
        }
        if let Some(id) = non_empty(ENV_CLIENT_ID) {
            self.client_id = Some(id);
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

/// Where requests go, decided once when the client is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiEndpoint {
    /// Through the development server's proxy.
    Proxy(Url),
    /// Straight to the service.
    Direct(Url),
}

impl ApiEndpoint {
    /// A client served from a known development origin goes through that
    /// origin's proxy; anything else talks to the service directly.
    pub fn resolve(served_from: Option<&str>, api_url: Option<&str>) -> Result<Self, String> {
        if let Some(origin) = served_from.map(str::trim).filter(|o| !o.is_empty()) {
            if DEV_ORIGINS.iter().any(|dev| origin.contains(dev)) {
                let base = format!("{}{}", origin.trim_end_matches('/'), PROXY_PATH);
                return Ok(ApiEndpoint::Proxy(normalize_base(&base)?));
            }
        }
        let direct = api_url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_API_URL);
        Ok(ApiEndpoint::Direct(normalize_base(direct)?))
    }

    pub fn from_config(config: &Config) -> Result<Self, String> {
        Self::resolve(config.served_from.as_deref(), config.api_url.as_deref())
    }

    pub fn url(&self) -> &Url {
        match self {
            ApiEndpoint::Proxy(url) | ApiEndpoint::Direct(url) => url,
        }
    }

    pub fn is_proxy(&self) -> bool {
        matches!(self, ApiEndpoint::Proxy(_))
    }
}

/// Parse and make sure the path ends in `/` so relative joins append.
fn normalize_base(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw).map_err(|e| format!("Invalid API URL '{}': {}", raw, e))?;
    if url.cannot_be_a_base() {
        return Err(format!("Invalid API URL '{}': not a base URL", raw));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_dev_origin_uses_proxy() {
        let endpoint = ApiEndpoint::resolve(Some("http://localhost:4000"), None).unwrap();
        assert!(endpoint.is_proxy());
        assert_eq!(endpoint.url().as_str(), "http://localhost:4000/api/v1/");

        let endpoint = ApiEndpoint::resolve(Some("http://127.0.0.1:4000/"), Some("https://api.example.com/v1")).unwrap();
        assert_eq!(endpoint.url().as_str(), "http://127.0.0.1:4000/api/v1/");
    }

    #[test]
    fn test_other_origins_go_direct() {
        let endpoint = ApiEndpoint::resolve(Some("https://study.example.com"), None).unwrap();
        assert_eq!(endpoint, ApiEndpoint::Direct(Url::parse("http://localhost:8080/api/v1/").unwrap()));

        let endpoint = ApiEndpoint::resolve(None, Some("https://api.example.com/api/v1")).unwrap();
        assert_eq!(endpoint.url().as_str(), "https://api.example.com/api/v1/");
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        assert!(ApiEndpoint::resolve(None, Some("not a url")).is_err());
        assert!(ApiEndpoint::resolve(None, Some("mailto:someone@example.com")).is_err());
    }

    #[test]
    fn test_env_overrides_skip_empty_values() {
        let env: HashMap<&str, &str> = [
            (ENV_API_URL, "https://api.example.com/api/v1"),
            (ENV_CLIENT_ID, "  "),
        ]
        .into_iter()
        .collect();

        let mut config = Config {
            client_id: Some("from-file".to_string()),
            ..Default::default()
        };
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.api_url.as_deref(), Some("https://api.example.com/api/v1"));
        assert_eq!(config.client_id.as_deref(), Some("from-file"));
        assert_eq!(config.served_from, None);
    }

    #[test]
    fn test_remember_email_keeps_overrides_out_of_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        Config {
            api_url: Some("https://api.example.com/api/v1".to_string()),
            ..Default::default()
        }
        .save_to(&path)
        .unwrap();

        let mut config = Config::load_from(&path).unwrap();
        config.apply_overrides(|k| (k == ENV_API_URL).then(|| "https://x".to_string()));
        config.client_id = Some("from-flag".to_string());
        assert_eq!(config.api_url.as_deref(), Some("https://x"));

        Config::remember_email_at(&path, "ana@example.com").unwrap();

        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.api_url.as_deref(), Some("https://api.example.com/api/v1"));
        assert_eq!(saved.client_id, None);
        assert_eq!(saved.last_email.as_deref(), Some("ana@example.com"));
    }

    #[test]
    fn test_remember_email_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        Config::remember_email_at(&path, "ana@example.com").unwrap();

        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.last_email.as_deref(), Some("ana@example.com"));
        assert_eq!(saved.api_url, None);
    }

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let config: Config = serde_json::from_str(r#"{"client_id": "abc", "storage": "keyring"}"#).unwrap();
        assert_eq!(config.client_id.as_deref(), Some("abc"));
        assert_eq!(config.storage, StorageBackend::Keyring);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }
}

//! Application settings loaded from `config.toml` with environment overrides.
//!
//! The backend is addressed through a single base URL resolved once at startup.
//! `fallback_urls` are only probed if the primary does not answer.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_PROBE_PATH: &str = "/api/health";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_PAGE_SIZE: usize = 10;
const DEFAULT_CACHE_TTL_SECS: u64 = 60;
/// Discord embeds hold at most 25 fields.
const MAX_PAGE_SIZE: usize = 25;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Backend API settings
    pub api: ApiSettings,
    /// Presentation settings
    #[serde(default)]
    pub display: DisplaySettings,
    /// Local snapshot cache settings
    #[serde(default)]
    pub cache: CacheSettings,
}

/// Where and how to reach the backend
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    /// Primary base URL (e.g. `https://ops.example.com`)
    pub base_url: String,
    /// Alternates probed in order when the primary is down at startup
    #[serde(default)]
    pub fallback_urls: Vec<String>,
    /// Path used to probe a candidate base URL
    #[serde(default = "default_probe_path")]
    pub probe_path: String,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Table rendering settings
#[derive(Debug, Clone, Deserialize)]
pub struct DisplaySettings {
    /// Rows per page in list commands
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

/// Cache freshness settings
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// How long a fetched collection is reused for autocomplete
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_probe_path() -> String {
    DEFAULT_PROBE_PATH.to_string()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

const fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

const fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl Settings {
    /// All base URLs to probe, primary first.
    #[must_use]
    pub fn candidate_urls(&self) -> Vec<String> {
        std::iter::once(self.api.base_url.clone())
            .chain(self.api.fallback_urls.iter().cloned())
            .collect()
    }

    /// Checks values that TOML parsing alone cannot catch.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if a URL is not absolute http(s), or a size is out of range.
    pub fn validate(&self) -> Result<()> {
        for url in self.candidate_urls() {
            let parsed = reqwest::Url::parse(&url).map_err(|e| Error::Config {
                message: format!("Invalid API URL '{url}': {e}"),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::Config {
                    message: format!("API URL '{url}' must use http or https"),
                });
            }
        }
        if self.api.timeout_secs == 0 {
            return Err(Error::Config {
                message: "api.timeout_secs must be greater than zero".to_string(),
            });
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.display.page_size) {
            return Err(Error::Config {
                message: format!("display.page_size must be between 1 and {MAX_PAGE_SIZE}"),
            });
        }
        Ok(())
    }
}

/// Parses settings from TOML text and applies environment overrides.
///
/// # Errors
/// Returns an error if the TOML is invalid or the resulting settings fail validation.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    let mut settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if let Ok(base_url) = std::env::var("OPS_API_BASE_URL") {
        tracing::info!("Using OPS_API_BASE_URL override: {}", base_url);
        settings.api.base_url = base_url;
    }

    settings.validate()?;
    Ok(settings)
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value fails validation
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading configuration from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_settings(&contents)
}

/// Loads settings from `OPS_CONFIG_PATH`, or `./config.toml` when unset.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var("OPS_CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_settings(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let toml_str = r#"
            [api]
            base_url = "https://ops.example.com"
            fallback_urls = ["http://localhost:5000", "http://localhost:3001"]
            probe_path = "/api/status"
            timeout_secs = 5

            [display]
            page_size = 25

            [cache]
            ttl_secs = 30
        "#;

        let settings: Settings = toml::from_str(toml_str).unwrap();
        settings.validate().unwrap();
        assert_eq!(settings.api.probe_path, "/api/status");
        assert_eq!(settings.api.timeout_secs, 5);
        assert_eq!(settings.display.page_size, 25);
        assert_eq!(settings.cache.ttl_secs, 30);
        assert_eq!(
            settings.candidate_urls(),
            vec![
                "https://ops.example.com",
                "http://localhost:5000",
                "http://localhost:3001"
            ]
        );
    }

    #[test]
    fn test_defaults_applied() {
        let settings: Settings = toml::from_str(
            r#"
            [api]
            base_url = "http://localhost:8000"
        "#,
        )
        .unwrap();

        assert!(settings.api.fallback_urls.is_empty());
        assert_eq!(settings.api.probe_path, DEFAULT_PROBE_PATH);
        assert_eq!(settings.api.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(settings.display.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(settings.cache.ttl_secs, DEFAULT_CACHE_TTL_SECS);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut settings: Settings = toml::from_str(
            r#"
            [api]
            base_url = "ftp://files.example.com"
        "#,
        )
        .unwrap();
        assert!(matches!(settings.validate(), Err(Error::Config { .. })));

        settings.api.base_url = "not a url".to_string();
        assert!(matches!(settings.validate(), Err(Error::Config { .. })));

        settings.api.base_url = "http://localhost:5000".to_string();
        settings.display.page_size = 0;
        assert!(matches!(settings.validate(), Err(Error::Config { .. })));

        settings.display.page_size = 26;
        assert!(matches!(settings.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_missing_api_section_is_an_error() {
        let result: std::result::Result<Settings, _> = toml::from_str("[display]\npage_size = 3");
        assert!(result.is_err());
    }
}

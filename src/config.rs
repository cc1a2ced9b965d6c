//! Configuration management.
//!
//! Handles loading, saving, and validating configuration from
//! platform-specific config directories. The `[site]` section is the
//! whole contract with the remote host: origin, selectors and the static
//! header profile live here rather than in the fetch or extraction code.

use crate::error::ConfigError;
use reqwest::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application name used for config directory.
const APP_NAME: &str = "BiqugeDl";

/// Default config filename.
const CONFIG_FILENAME: &str = "config.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target site profile.
    pub site: SiteProfile,

    /// Download behavior settings.
    pub download: DownloadConfig,
}

/// Declarative description of the novel site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteProfile {
    /// Scheme and host every relative link is resolved against.
    pub origin: String,

    /// Path of the search endpoint (POST target).
    pub search_path: String,

    /// Form field carrying the search term.
    pub search_field: String,

    /// CSS selectors for the three page kinds.
    pub selectors: SelectorConfig,

    /// Static header profile sent with every request.
    pub headers: BTreeMap<String, String>,
}

impl Default for SiteProfile {
    fn default() -> Self {
        let headers = [
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
            ),
            ("Accept-Encoding", "gzip, deflate"),
            (
                "Accept-Language",
                "zh-CN,zh;q=0.9,en;q=0.8,en-GB;q=0.7,en-US;q=0.6",
            ),
            ("Cache-Control", "no-cache"),
            ("Cookie", "_abcde_qweasd=0; _abcde_qweasd=0"),
            ("Pragma", "no-cache"),
            ("Upgrade-Insecure-Requests", "1"),
            (
                "User-Agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36 Edg/133.0.0.0",
            ),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            origin: "http://www.xbiqugu.la".to_string(),
            search_path: "/modules/article/waps.php".to_string(),
            search_field: "searchkey".to_string(),
            selectors: SelectorConfig::default(),
            headers,
        }
    }
}

impl SiteProfile {
    /// Builds a profile that targets another origin, keeping everything else.
    pub fn with_origin(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            ..Self::default()
        }
    }

    /// Absolute URL of the search endpoint.
    pub fn search_url(&self) -> String {
        format!("{}{}", self.origin.trim_end_matches('/'), self.search_path)
    }

    /// Site root with a trailing slash.
    pub fn root_url(&self) -> String {
        format!("{}/", self.origin.trim_end_matches('/'))
    }
}

/// CSS selectors used for parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Result-row anchors on the search page.
    pub search_hits: String,

    /// Chapter anchors on the catalog page.
    pub chapters: String,

    /// Content container on a chapter page.
    pub body: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            search_hits:
                "#wrapper > #main > #content > form > table.grid > tbody > tr > td:nth-child(1) > a"
                    .to_string(),
            chapters: "#list > dl > dd > a".to_string(),
            body: "#content".to_string(),
        }
    }
}

/// Download behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Base directory that holds one sub-directory per novel.
    pub output_directory: PathBuf,

    /// Pause after each saved chapter, in milliseconds.
    pub delay_after_write_ms: u64,

    /// Per-request timeout in seconds. Requests never time out when unset.
    pub request_timeout_sec: Option<u64>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("Novel"),
            delay_after_write_ms: 125,
            request_timeout_sec: None,
        }
    }
}

impl DownloadConfig {
    pub fn delay_after_write(&self) -> Duration {
        Duration::from_millis(self.delay_after_write_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_sec.map(Duration::from_secs)
    }
}

impl Config {
    /// Returns the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Returns the full path to the config file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILENAME))
    }

    /// Loads configuration from the default location.
    ///
    /// If the config file doesn't exist, creates a default one.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let site = &self.site;

        match url::Url::parse(&site.origin) {
            Ok(origin) if matches!(origin.scheme(), "http" | "https") => {}
            _ => {
                return Err(ConfigError::invalid(
                    "site.origin",
                    "must be an absolute http(s) URL",
                ));
            }
        }

        if site.search_field.trim().is_empty() {
            return Err(ConfigError::invalid("site.search_field", "must not be empty"));
        }

        for (key, selector) in [
            ("site.selectors.search_hits", &site.selectors.search_hits),
            ("site.selectors.chapters", &site.selectors.chapters),
            ("site.selectors.body", &site.selectors.body),
        ] {
            if selector.trim().is_empty() {
                return Err(ConfigError::invalid(key, "must not be empty"));
            }
        }

        for (name, value) in &site.headers {
            if HeaderName::from_bytes(name.as_bytes()).is_err() {
                return Err(ConfigError::invalid(
                    format!("site.headers.{name}"),
                    "not a valid header name",
                ));
            }
            if HeaderValue::from_str(value).is_err() {
                return Err(ConfigError::invalid(
                    format!("site.headers.{name}"),
                    "not a valid header value",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.site.origin, "http://www.xbiqugu.la");
        assert_eq!(config.download.output_directory, PathBuf::from("Novel"));
        assert_eq!(config.download.delay_after_write(), Duration::from_millis(125));
        assert!(config.download.request_timeout().is_none());
        assert_eq!(
            config.site.headers.get("Accept-Encoding").map(String::as_str),
            Some("gzip, deflate")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_search_url() {
        let profile = SiteProfile::with_origin("http://127.0.0.1:8080/");
        assert_eq!(
            profile.search_url(),
            "http://127.0.0.1:8080/modules/article/waps.php"
        );
        assert_eq!(profile.root_url(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = Config::default();
        config.download.request_timeout_sec = Some(20);
        let file = NamedTempFile::new().unwrap();

        config.save_to(file.path()).unwrap();

        let loaded = Config::load_from(file.path()).unwrap();
        assert_eq!(loaded.site.selectors.chapters, config.site.selectors.chapters);
        assert_eq!(loaded.download.request_timeout_sec, Some(20));
    }

    #[test]
    fn test_missing_file_creates_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILENAME);

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.site.search_field, "searchkey");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[download]\ndelay_after_write_ms = 0\n").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.download.delay_after_write_ms, 0);
        assert_eq!(config.site.selectors.body, "#content");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.site.origin = "www.example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.site.selectors.body = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config
            .site
            .headers
            .insert("Bad Header".to_string(), "x".to_string());
        assert!(config.validate().is_err());
    }
}

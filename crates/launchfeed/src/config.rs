//! Configuration management for launchfeed.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::feed::{CursorPolicy, EndOfFeed};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default config directory name.
const CONFIG_DIR_NAME: &str = "launchfeed";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "LAUNCHFEED_";

/// Public launch query endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.spacexdata.com/v4/launches/query";

/// Number of launches requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 6;

/// Distance from the bottom of the viewport that triggers the next page.
pub const DEFAULT_SCROLL_MARGIN: u32 = 100;

/// Page heading shown above the card grid.
pub const DEFAULT_TITLE: &str = "List of SpaceX launches";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `LAUNCHFEED_`, sections split on `__`)
/// 2. TOML config file at `~/.config/launchfeed/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upstream endpoint configuration.
    pub api: ApiConfig,
    /// Scroll threshold configuration.
    pub scroll: ScrollConfig,
    /// Pagination policy configuration.
    pub feed: FeedConfig,
    /// Rendering configuration.
    pub render: RenderConfig,
}

/// Upstream endpoint configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Query endpoint URL.
    pub endpoint: String,
    /// Launches requested per page.
    pub page_size: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Scroll-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Margin below the viewport inside which the next page is requested.
    pub margin: u32,
    /// Viewport height used when scroll signals are synthesised (terminal modes).
    pub viewport_height: u32,
}

/// Pagination policy configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// When to stop requesting further pages.
    pub end_of_feed: EndOfFeed,
    /// What happens to the page cursor when a fetch fails.
    pub cursor_policy: CursorPolicy,
}

/// Rendering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Page heading.
    pub title: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: 30,
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            margin: DEFAULT_SCROLL_MARGIN,
            viewport_height: 900,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.api.page_size == 0 {
            return Err(Error::ConfigValidation {
                message: "page_size must be greater than 0".to_string(),
            });
        }

        if self.api.timeout_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "timeout_secs must be greater than 0".to_string(),
            });
        }

        match reqwest::Url::parse(&self.api.endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(Error::ConfigValidation {
                    message: format!("unsupported endpoint scheme: {}", url.scheme()),
                });
            }
            Err(e) => {
                return Err(Error::ConfigValidation {
                    message: format!("invalid endpoint {}: {e}", self.api.endpoint),
                });
            }
        }

        Ok(())
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.api.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.api.page_size, 6);
        assert_eq!(config.scroll.margin, 100);
        assert_eq!(config.feed.end_of_feed, EndOfFeed::ShortPage);
        assert_eq!(config.feed.cursor_policy, CursorPolicy::Hold);
        assert_eq!(config.render.title, "List of SpaceX launches");
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_page_size() {
        let mut config = Config::default();
        config.api.page_size = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("page_size"));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.api.timeout_secs = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("timeout_secs"));
    }

    #[test]
    fn test_validate_bad_endpoint() {
        let mut config = Config::default();
        config.api.endpoint = "not a url".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("endpoint"));

        config.api.endpoint = "ftp://example.com/query".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("ftp"));
    }

    #[test]
    fn test_request_timeout() {
        let config = Config::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("launchfeed"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // A missing file falls back to defaults
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!(
            "launchfeed-config-test-{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"
            [api]
            page_size = 12

            [feed]
            end_of_feed = "never"
            cursor_policy = "advance"
            "#,
        )
        .unwrap();

        let config = Config::load_from(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.api.page_size, 12);
        assert_eq!(config.api.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.feed.end_of_feed, EndOfFeed::Never);
        assert_eq!(config.feed.cursor_policy, CursorPolicy::Advance);
    }

    #[test]
    fn test_load_from_invalid_toml_file_is_error() {
        let path = std::env::temp_dir().join(format!(
            "launchfeed-invalid-config-test-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[api]\npage_size = 0\n").unwrap();

        let result = Config::load_from(Some(path.clone()));
        std::fs::remove_file(&path).unwrap();

        let err = result.unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn test_feed_config_deserialize() {
        let json = r#"{"end_of_feed": "never"}"#;
        let feed: FeedConfig = serde_json::from_str(json).unwrap();
        assert_eq!(feed.end_of_feed, EndOfFeed::Never);
        assert_eq!(feed.cursor_policy, CursorPolicy::Hold);
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("page_size"));
        assert!(json.contains("short_page"));
    }
}

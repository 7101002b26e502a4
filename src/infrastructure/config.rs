//! Configuration infrastructure
//!
//! Configuration is one JSON file holding four sections:
//! 1. Scraper pipeline settings
//! 2. HTTP session settings
//! 3. CSS selector candidates
//! 4. Logging settings
//!
//! Every section falls back to its defaults field by field, so a partial
//! file only overrides what it names.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

pub use super::http_client::HttpClientConfig;
pub use super::parsing::SelectorConfig;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scraper: ScraperConfig,
    pub http: HttpClientConfig,
    pub selectors: SelectorConfig,
    pub logging: LoggingConfig,
}

/// Pipeline settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Quantity requested in the add-to-cart submission
    pub default_quantity: u32,

    /// Read back the cart view page after the checkout stage
    pub confirm_with_cart_view: bool,

    /// Path of the cart view page on the product host
    pub cart_view_path: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            default_quantity: retail::DEFAULT_QUANTITY,
            confirm_with_cart_view: false,
            cart_view_path: retail::CART_VIEW_PATH.to_string(),
        }
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for log files; the platform data directory when unset
    pub log_dir: Option<PathBuf>,

    /// Offset from UTC used for timestamps
    pub utc_offset_hours: i32,

    /// Module-specific log level filters (e.g., "reqwest": "warn")
    pub module_filters: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: None,
            utc_offset_hours: defaults::LOG_UTC_OFFSET_HOURS,
            module_filters: HashMap::from([
                ("reqwest".to_string(), "warn".to_string()),
                ("hyper".to_string(), "warn".to_string()),
                ("html5ever".to_string(), "warn".to_string()),
            ]),
        }
    }
}

/// Configuration file manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Manager for the config file in the user config directory
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME);
        Ok(Self { config_path })
    }

    /// Manager for an explicit config file path
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Load configuration, writing the defaults when no file exists yet.
    ///
    /// A file that no longer parses is backed up next to the original and
    /// replaced by the defaults.
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !fs::try_exists(&self.config_path).await.unwrap_or(false) {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .context("Failed to read configuration file")?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                info!("Loaded configuration from: {:?}", self.config_path);
                Ok(config)
            }
            Err(parse_error) => {
                warn!("Configuration file is invalid: {}", parse_error);

                let backup_path = self.config_path.with_extension("json.corrupted");
                if let Err(e) = fs::copy(&self.config_path, &backup_path).await {
                    warn!("Failed to create backup of corrupted config: {}", e);
                } else {
                    info!("Backed up corrupted config to: {:?}", backup_path);
                }

                self.reset_to_defaults().await
            }
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Overwrite the config file with the defaults
    pub async fn reset_to_defaults(&self) -> Result<AppConfig> {
        let default_config = AppConfig::default();
        self.save_config(&default_config)
            .await
            .context("Failed to save default configuration")?;
        info!("Reset to default configuration");
        Ok(default_config)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Retailer page contract
pub mod retail {
    /// Quantity requested when adding to cart; the retailer caps it to what is in stock
    pub const DEFAULT_QUANTITY: u32 = 999;

    /// Cart view page, relative to the product host
    pub const CART_VIEW_PATH: &str = "/gp/cart/view.html?ref_=nav_cart";

    /// Product URL schemes accepted as pipeline input
    pub const ACCEPTED_SCHEMES: &[&str] = &["http", "https"];
}

/// Default values
pub mod defaults {
    pub const APP_DIR_NAME: &str = "stock-probe";

    pub const CONFIG_FILE_NAME: &str = "config.json";

    pub const LOG_FILE_PREFIX: &str = "stock-probe.log";

    /// Desktop browser user agent; the retailer serves a reduced page to unknown clients
    pub const USER_AGENT: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

    pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9,fr;q=0.8,es;q=0.7";

    /// Request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    pub const MAX_REDIRECTS: usize = 10;

    /// Default log level
    pub const LOG_LEVEL: &str = "info";

    pub const LOG_JSON_FORMAT: bool = false;

    pub const LOG_CONSOLE_OUTPUT: bool = true;

    pub const LOG_FILE_OUTPUT: bool = false;

    pub const LOG_UTC_OFFSET_HOURS: i32 = 0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_values() {
        let config = AppConfig::default();
        assert_eq!(config.scraper.default_quantity, 999);
        assert!(!config.scraper.confirm_with_cart_view);
        assert_eq!(config.scraper.cart_view_path, "/gp/cart/view.html?ref_=nav_cart");
        assert_eq!(config.http.timeout_seconds, defaults::REQUEST_TIMEOUT_SECONDS);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{"scraper": {"confirm_with_cart_view": true}, "http": {"timeout_seconds": 5}}"#,
        )
        .unwrap();

        assert!(config.scraper.confirm_with_cart_view);
        assert_eq!(config.scraper.default_quantity, 999);
        assert_eq!(config.http.timeout_seconds, 5);
        assert_eq!(config.http.max_redirects, defaults::MAX_REDIRECTS);
        assert_eq!(config.selectors, SelectorConfig::default());
    }

    #[tokio::test]
    async fn test_load_creates_default_file() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp_dir.path().join("nested").join("config.json"));

        let config = manager.load_config().await.unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(manager.config_path().exists());
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp_dir.path().join("config.json"));

        let mut config = AppConfig::default();
        config.scraper.default_quantity = 30;
        config.logging.json_format = true;
        manager.save_config(&config).await.unwrap();

        let loaded = manager.load_config().await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_corrupted_file_is_backed_up_and_reset() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let manager = ConfigManager::with_path(&path);
        let config = manager.load_config().await.unwrap();

        assert_eq!(config, AppConfig::default());
        assert!(path.with_extension("json.corrupted").exists());
    }
}

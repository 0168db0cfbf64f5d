//! # Checkout Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     XTRAPUSH_LOCALE=international                                      │
//! │     XTRAPUSH_STOCK_TIMEOUT_SECS=5                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/xtrapush-checkout/checkout.toml (Linux)                  │
//! │     ~/Library/Application Support/com.xtrapush.checkout/ (macOS)       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     Malawi locale, 10s stock check, 30s submission                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # checkout.toml
//! [market]
//! locale = "malawi"          # malawi | international
//!
//! [checkout]
//! stock_timeout_secs = 10
//! submit_timeout_secs = 30
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use xtrapush_core::Locale;

use crate::error::{CheckoutError, CheckoutResult};

// =============================================================================
// Sections
// =============================================================================

/// Which market prices are shown for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketSettings {
    #[serde(default)]
    pub locale: Locale,
}

/// Timeouts for the two network calls the checkout makes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSettings {
    /// Live stock re-fetch limit (seconds). Exceeding it blocks checkout.
    #[serde(default = "default_stock_timeout")]
    pub stock_timeout_secs: u64,

    /// Submission limit (seconds).
    #[serde(default = "default_submit_timeout")]
    pub submit_timeout_secs: u64,
}

fn default_stock_timeout() -> u64 {
    10
}

fn default_submit_timeout() -> u64 {
    30
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        CheckoutSettings {
            stock_timeout_secs: default_stock_timeout(),
            submit_timeout_secs: default_submit_timeout(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete checkout configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutConfig {
    #[serde(default)]
    pub market: MarketSettings,

    #[serde(default)]
    pub checkout: CheckoutSettings,
}

impl CheckoutConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (checkout.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CheckoutResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading checkout config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load checkout config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> CheckoutResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CheckoutError::Config("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Checkout config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CheckoutResult<()> {
        if self.checkout.stock_timeout_secs == 0 {
            return Err(CheckoutError::Config(
                "stock_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.checkout.submit_timeout_secs == 0 {
            return Err(CheckoutError::Config(
                "submit_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(locale) = std::env::var("XTRAPUSH_LOCALE") {
            match locale.parse() {
                Ok(parsed) => {
                    debug!(locale = %locale, "Overriding locale from environment");
                    self.market.locale = parsed;
                }
                Err(e) => warn!("{}", e),
            }
        }

        if let Ok(secs) = std::env::var("XTRAPUSH_STOCK_TIMEOUT_SECS") {
            if let Ok(s) = secs.parse::<u64>() {
                debug!(secs = s, "Overriding stock timeout from environment");
                self.checkout.stock_timeout_secs = s;
            }
        }

        if let Ok(secs) = std::env::var("XTRAPUSH_SUBMIT_TIMEOUT_SECS") {
            if let Ok(s) = secs.parse::<u64>() {
                self.checkout.submit_timeout_secs = s;
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "xtrapush", "checkout")
            .map(|dirs| dirs.config_dir().join("checkout.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn locale(&self) -> Locale {
        self.market.locale
    }

    pub fn stock_timeout(&self) -> Duration {
        Duration::from_secs(self.checkout.stock_timeout_secs)
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.checkout.submit_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CheckoutConfig::default();
        assert_eq!(config.locale(), Locale::Malawi);
        assert_eq!(config.stock_timeout(), Duration::from_secs(10));
        assert_eq!(config.submit_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let mut config = CheckoutConfig::default();
        config.checkout.stock_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.checkout.stock_timeout_secs = 5;
        config.checkout.submit_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_parsing_with_partial_sections() {
        let config: CheckoutConfig = toml::from_str(
            r#"
            [market]
            locale = "international"
            "#,
        )
        .unwrap();

        assert_eq!(config.locale(), Locale::International);
        assert_eq!(config.checkout.stock_timeout_secs, 10);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = std::env::temp_dir()
            .join(format!("xtrapush-{}", uuid::Uuid::new_v4()))
            .join("checkout.toml");

        let mut config = CheckoutConfig::default();
        config.checkout.submit_timeout_secs = 45;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let loaded: CheckoutConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded.checkout.submit_timeout_secs, 45);

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}

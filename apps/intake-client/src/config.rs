//! # Client Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     INTAKE_API_BASE_URL=https://api.example-clinic.co.uk               │
//! │     INTAKE_SHIPPING_PRICE=4.99                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/intake-client/client.toml (Linux)                        │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! api_base_url = "https://api.example-clinic.co.uk"
//! shipping_price = 4.99
//! currency_symbol = "£"
//! request_timeout_secs = 15
//! snapshot_path = "/tmp/intake-session.json"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use intake_core::Money;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

/// Configuration for one client install.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Root of the clinic REST API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Flat shipping charge, in pounds.
    #[serde(default = "default_shipping_price")]
    pub shipping_price: f64,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Upper bound on a single API call.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Where session snapshots are written. `None` uses the platform data dir.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

fn default_api_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_shipping_price() -> f64 {
    4.99
}

fn default_currency_symbol() -> String {
    "£".to_string()
}

fn default_request_timeout() -> u64 {
    15
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_base_url: default_api_base_url(),
            shipping_price: default_shipping_price(),
            currency_symbol: default_currency_symbol(),
            request_timeout_secs: default_request_timeout(),
            snapshot_path: None,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (client.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ClientError::NoPath("config"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Client config saved");
        Ok(())
    }

    pub fn validate(&self) -> ClientResult<()> {
        let url = self.api_base_url.trim();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ClientError::InvalidConfig(format!(
                "api_base_url must start with http:// or https://, got: {}",
                url
            )));
        }

        if !self.shipping_price.is_finite() || self.shipping_price < 0.0 {
            return Err(ClientError::InvalidConfig(
                "shipping_price must be a non-negative number".into(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `INTAKE_*` overrides read through `lookup`.
    ///
    /// Unparseable numbers are ignored with a warning.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("INTAKE_API_BASE_URL") {
            debug!(url = %url, "Overriding API base URL from environment");
            self.api_base_url = url;
        }

        if let Some(price) = lookup("INTAKE_SHIPPING_PRICE") {
            match price.parse::<f64>() {
                Ok(p) => self.shipping_price = p,
                Err(_) => warn!(value = %price, "Ignoring INTAKE_SHIPPING_PRICE"),
            }
        }

        if let Some(symbol) = lookup("INTAKE_CURRENCY_SYMBOL") {
            self.currency_symbol = symbol;
        }

        if let Some(secs) = lookup("INTAKE_REQUEST_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.request_timeout_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring INTAKE_REQUEST_TIMEOUT_SECS"),
            }
        }

        if let Some(path) = lookup("INTAKE_SNAPSHOT_PATH") {
            self.snapshot_path = Some(PathBuf::from(path));
        }
    }

    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("uk", "clinic", "intake-client")
            .map(|dirs| dirs.config_dir().join("client.toml"))
    }

    /// Snapshot file location: configured path, else the platform data dir.
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.snapshot_path.clone().or_else(|| {
            ProjectDirs::from("uk", "clinic", "intake-client")
                .map(|dirs| dirs.data_dir().join("session.json"))
        })
    }

    pub fn shipping(&self) -> Money {
        Money::from_decimal(self.shipping_price)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Formats an amount with the configured symbol, e.g. `-£12.34`.
    pub fn format_currency(&self, amount: Money) -> String {
        format!(
            "{}{}{}.{:02}",
            if amount.is_negative() { "-" } else { "" },
            self.currency_symbol,
            amount.pounds().abs(),
            amount.pence_part().abs()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.shipping().pence(), 499);
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_env_overrides() {
        let vars = env(&[
            ("INTAKE_API_BASE_URL", "https://api.test"),
            ("INTAKE_SHIPPING_PRICE", "0"),
            ("INTAKE_REQUEST_TIMEOUT_SECS", "nope"),
        ]);
        let mut config = ClientConfig::default();
        config.apply_env_overrides(|k| vars.get(k).cloned());

        assert_eq!(config.api_base_url, "https://api.test");
        assert!(config.shipping().is_zero());
        assert_eq!(config.request_timeout_secs, 15);
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::default();
        config.api_base_url = "ftp://nope".to_string();
        assert!(config.validate().is_err());

        config.api_base_url = "https://ok".to_string();
        config.shipping_price = -1.0;
        assert!(config.validate().is_err());

        config.shipping_price = 0.0;
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_partial_file_uses_defaults() {
        let config: ClientConfig = toml::from_str("shipping_price = 2.5").unwrap();
        assert_eq!(config.shipping().pence(), 250);
        assert_eq!(config.currency_symbol, "£");
    }

    #[test]
    fn test_format_currency() {
        let config = ClientConfig::default();
        assert_eq!(config.format_currency(Money::from_pence(1234)), "£12.34");
        assert_eq!(config.format_currency(Money::from_pence(5)), "£0.05");
        assert_eq!(config.format_currency(Money::from_pence(-1234)), "-£12.34");
    }
}

//! Application configuration loading from config.toml and the environment.
//!
//! The TOML file carries the defaults; `DATABASE_URL` and `CARTWHEEL_BIND`
//! environment variables override it so deployments can reconfigure without
//! editing the file.

/// Database configuration and connection management
pub mod database;

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Database settings
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Order notification settings
    #[serde(default)]
    pub notifications: NotificationConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address the API listens on
    #[serde(default = "default_bind")]
    pub bind: String,
}

/// Database settings
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SeaORM connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

/// Order notification settings
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Storefront name used in notification copy
    #[serde(default = "default_site_name")]
    pub site_name: String,
    /// Recipient of admin order alerts
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    /// Whether SMS confirmations are rendered at all
    #[serde(default)]
    pub sms_enabled: bool,
    /// Country code prefixed to local phone numbers for SMS
    #[serde(default = "default_country_code")]
    pub default_country_code: String,
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_database_url() -> String {
    "sqlite://data/cartwheel.sqlite?mode=rwc".to_string()
}

fn default_site_name() -> String {
    "CartWheel".to_string()
}

fn default_admin_email() -> String {
    "admin@example.com".to_string()
}

fn default_country_code() -> String {
    "254".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            site_name: default_site_name(),
            admin_email: default_admin_email(),
            sms_enabled: false,
            default_country_code: default_country_code(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file, then applies environment
    /// overrides.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config: AppConfig = match std::fs::read_to_string(path.as_ref()) {
            Ok(contents) => toml::from_str(&contents).map_err(|e| Error::Config {
                message: format!("Failed to parse {}: {e}", path.as_ref().display()),
            })?,
            // A missing file just means "all defaults"
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppConfig {
                server: ServerConfig::default(),
                database: DatabaseConfig::default(),
                notifications: NotificationConfig::default(),
            },
            Err(e) => {
                return Err(Error::Config {
                    message: format!("Failed to read {}: {e}", path.as_ref().display()),
                });
            }
        };

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database.url = url;
        }
        if let Ok(bind) = std::env::var("CARTWHEEL_BIND") {
            config.server.bind = bind;
        }

        Ok(config)
    }

    /// Loads configuration from the default location (./config.toml).
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_default() -> Result<Self> {
        Self::load("config.toml")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [server]
            bind = "0.0.0.0:9000"

            [database]
            url = "sqlite::memory:"

            [notifications]
            site_name = "Savannah Store"
            admin_email = "orders@savannah.example"
            sms_enabled = true
            default_country_code = "254"
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.notifications.site_name, "Savannah Store");
        assert!(config.notifications.sms_enabled);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8000");
        assert!(!config.notifications.sms_enabled);
        assert_eq!(config.notifications.default_country_code, "254");
    }
}

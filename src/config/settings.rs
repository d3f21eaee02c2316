//! Application settings.
//!
//! Settings start from built-in defaults, are overridden by an optional
//! `config.toml` next to the binary, and finally by environment variables
//! (`DATABASE_URL`, `BIND_ADDRESS`, `SESSION_TTL_DAYS`). Environment wins so
//! deployments can tweak a containerized install without editing files.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Path of the optional settings file, relative to the working directory.
const SETTINGS_FILE: &str = "config.toml";

/// Runtime configuration for the service.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SeaORM connection string
    pub database_url: String,
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// How long login sessions stay valid, in days
    pub session_ttl_days: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://data/fundmgr.sqlite?mode=rwc".to_string(),
            bind_address: "127.0.0.1:8000".to_string(),
            session_ttl_days: 30,
        }
    }
}

impl Settings {
    /// Loads settings from defaults, `config.toml`, and the environment,
    /// in increasing order of precedence.
    pub fn load() -> Result<Self> {
        let mut settings = Self::default();

        if Path::new(SETTINGS_FILE).exists() {
            let raw = std::fs::read_to_string(SETTINGS_FILE)?;
            settings = toml::from_str(&raw).map_err(|e| Error::Config {
                message: format!("Failed to parse {SETTINGS_FILE}: {e}"),
            })?;
            info!("Loaded settings from {SETTINGS_FILE}");
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            settings.database_url = url;
        }
        if let Ok(addr) = std::env::var("BIND_ADDRESS") {
            settings.bind_address = addr;
        }
        if let Ok(ttl) = std::env::var("SESSION_TTL_DAYS") {
            settings.session_ttl_days = ttl.parse().map_err(|_| Error::Config {
                message: format!("SESSION_TTL_DAYS must be a number, got {ttl:?}"),
            })?;
        }

        if settings.session_ttl_days <= 0 {
            return Err(Error::Config {
                message: "session_ttl_days must be positive".to_string(),
            });
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.bind_address, "127.0.0.1:8000");
        assert_eq!(settings.session_ttl_days, 30);
        assert!(settings.database_url.starts_with("sqlite://"));
    }

    #[test]
    fn test_parse_partial_toml() {
        // Missing keys fall back to defaults thanks to #[serde(default)]
        let settings: Settings = toml::from_str("bind_address = \"0.0.0.0:9000\"").unwrap();
        assert_eq!(settings.bind_address, "0.0.0.0:9000");
        assert_eq!(settings.session_ttl_days, 30);
    }
}

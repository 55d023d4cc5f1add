use crate::config::AppConfig;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/Config.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration from the default path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load() -> Result<AppConfig> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Loads configuration by layering built-in defaults, the TOML file at
    /// `path` (skipped if absent), and `APP_`-prefixed environment variables.
    ///
    /// Nested keys use `__`, e.g. `APP_TELEGRAM__BOT_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Config file not found, using defaults and environment");
        }

        let config: AppConfig = Self::base()
            .merge(Toml::file(path))
            .merge(Env::prefixed("APP_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

        Ok(config)
    }

    /// Loads configuration from an inline TOML document layered over defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed.
    pub fn load_from_str(toml: &str) -> Result<AppConfig> {
        let config: AppConfig = Self::base()
            .merge(Toml::string(toml))
            .extract()
            .context("Failed to parse configuration")?;

        Ok(config)
    }

    fn base() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
    }
}

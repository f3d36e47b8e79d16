//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::fetch::FetcherConfig;
use crate::names::NameTables;

/// Config file looked up when none is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "./config.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// PokéAPI endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokeApiConfig {
    #[serde(default = "default_pokeapi_url")]
    pub base_url: String,

    /// Minimum spacing between species lookups
    #[serde(default = "default_species_delay")]
    pub request_delay_ms: u64,

    #[serde(default = "default_pokeapi_timeout")]
    pub timeout_seconds: u64,
}

fn default_pokeapi_url() -> String {
    "https://pokeapi.co/api/v2".to_string()
}

fn default_species_delay() -> u64 {
    300
}

fn default_pokeapi_timeout() -> u64 {
    20
}

impl Default for PokeApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_pokeapi_url(),
            request_delay_ms: default_species_delay(),
            timeout_seconds: default_pokeapi_timeout(),
        }
    }
}

/// Showdown replay server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowdownConfig {
    #[serde(default = "default_showdown_url")]
    pub base_url: String,

    /// Minimum spacing between search page requests
    #[serde(default = "default_page_delay")]
    pub page_delay_ms: u64,

    /// Minimum spacing between replay downloads
    #[serde(default = "default_replay_delay")]
    pub replay_delay_ms: u64,

    #[serde(default = "default_showdown_timeout")]
    pub timeout_seconds: u64,
}

fn default_showdown_url() -> String {
    "https://replay.pokemonshowdown.com".to_string()
}

fn default_page_delay() -> u64 {
    500
}

fn default_replay_delay() -> u64 {
    200
}

fn default_showdown_timeout() -> u64 {
    15
}

impl Default for ShowdownConfig {
    fn default() -> Self {
        Self {
            base_url: default_showdown_url(),
            page_delay_ms: default_page_delay(),
            replay_delay_ms: default_replay_delay(),
            timeout_seconds: default_showdown_timeout(),
        }
    }
}

/// On-disk response cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory; caching is off when unset
    #[serde(default)]
    pub dir: Option<PathBuf>,

    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
}

fn default_cache_ttl() -> u64 {
    24 * 3600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            ttl_seconds: default_cache_ttl(),
        }
    }
}

/// Additions to the built-in name tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamesConfig {
    /// Applied after the built-in substitutions, in key order
    #[serde(default)]
    pub substitutions: BTreeMap<String, String>,

    /// Merged over the built-in overrides
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub pokeapi: PokeApiConfig,

    #[serde(default)]
    pub showdown: ShowdownConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub names: NamesConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            pokeapi: PokeApiConfig::default(),
            showdown: ShowdownConfig::default(),
            cache: CacheConfig::default(),
            names: NamesConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load an explicitly requested file, or the default file if present,
    /// or fall back to built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    debug!("No config file at {}, using defaults", DEFAULT_CONFIG_PATH);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pokeapi.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "PokéAPI base URL must not be empty".to_string(),
            ));
        }

        if self.showdown.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Showdown base URL must not be empty".to_string(),
            ));
        }

        if self.pokeapi.timeout_seconds == 0 || self.showdown.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Timeouts must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Built-in name tables extended with the `[names]` section.
    pub fn name_tables(&self) -> NameTables {
        NameTables::default().extended(
            self.names.substitutions.clone(),
            self.names.overrides.clone(),
        )
    }

    /// HTTP settings for species lookups.
    pub fn pokeapi_fetcher(&self) -> FetcherConfig {
        FetcherConfig {
            timeout: Duration::from_secs(self.pokeapi.timeout_seconds),
            request_delay: Duration::from_millis(self.pokeapi.request_delay_ms),
            ..self.cached_fetcher()
        }
    }

    /// HTTP settings for replay downloads; search pages share the client
    /// with their own spacing (`page_delay_ms`).
    pub fn showdown_fetcher(&self) -> FetcherConfig {
        FetcherConfig {
            timeout: Duration::from_secs(self.showdown.timeout_seconds),
            request_delay: Duration::from_millis(self.showdown.replay_delay_ms),
            ..self.cached_fetcher()
        }
    }

    fn cached_fetcher(&self) -> FetcherConfig {
        FetcherConfig {
            cache_dir: self.cache.dir.clone(),
            cache_ttl: Duration::from_secs(self.cache.ttl_seconds),
            ..FetcherConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.pokeapi.base_url, "https://pokeapi.co/api/v2");
        assert_eq!(config.pokeapi.request_delay_ms, 300);
        assert_eq!(config.showdown.page_delay_ms, 500);
        assert_eq!(config.showdown.replay_delay_ms, 200);
        assert_eq!(config.cache.dir, None);
        assert_eq!(config.cache.ttl_seconds, 86400);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            log_level = "debug"

            [showdown]
            page_delay_ms = 1000
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.showdown.page_delay_ms, 1000);
        assert_eq!(config.showdown.replay_delay_ms, 200);
        assert_eq!(config.pokeapi.timeout_seconds, 20);
        assert_eq!(config.cache.ttl_seconds, 86400);
    }

    #[test]
    fn test_names_section_extends_tables() {
        let config = AppConfig::from_toml(
            r#"
            [names.substitutions]
            "ñ" = "n"

            [names.overrides]
            "flabebe" = "flabebe-red"
            "#,
        )
        .unwrap();

        let tables = config.name_tables();
        let defaults = NameTables::default();
        assert_eq!(tables.substitution_count(), defaults.substitution_count() + 1);
        assert_eq!(tables.resolve("Flabébé"), "flabebe-red");
        assert_eq!(tables.normalize("Señor"), "senor");
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_timeout() {
        let mut config = AppConfig::default();
        config.showdown.timeout_seconds = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_url() {
        let result = AppConfig::from_toml("[pokeapi]\nbase_url = \"  \"\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let result = AppConfig::load_or_default(Some(Path::new("/nonexistent/config.toml")));
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[cache]\ndir = \"/tmp/replays\"\nttl_seconds = 60\n").unwrap();

        let config = AppConfig::load_or_default(Some(&path)).unwrap();
        let fetcher = config.showdown_fetcher();

        assert_eq!(fetcher.cache_dir, Some(PathBuf::from("/tmp/replays")));
        assert_eq!(fetcher.cache_ttl, Duration::from_secs(60));
        assert_eq!(fetcher.request_delay, Duration::from_millis(200));
        assert_eq!(fetcher.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        // Should be parseable
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.showdown.base_url, parsed.showdown.base_url);
    }
}

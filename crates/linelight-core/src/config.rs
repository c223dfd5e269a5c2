//! Service configuration.
//!
//! Loaded from TOML. Every section is `#[serde(default)]`, so a file only
//! needs the keys it wants to change.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::cache::DEFAULT_CAPACITY;
use crate::language::LanguageMap;

/// Main service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerConfig,

    /// Result cache settings
    pub cache: CacheConfig,

    /// Extension to language table
    pub languages: LanguagesConfig,

    /// Generated markup settings
    pub markup: MarkupConfig,
}

impl Config {
    /// Loads config from the default location, falling back to defaults.
    pub fn load() -> Self {
        match Self::load_from_default_path() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default config: {}", e);
                Self::default()
            }
        }
    }

    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads from the default config path.
    fn load_from_default_path() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("linelight").join("config.toml"))
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Upper bound on a single highlight call (ms)
    pub request_timeout_ms: u64,

    /// Allow cross-origin requests
    pub cors: bool,
}

impl ServerConfig {
    /// `host:port` for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            request_timeout_ms: 5000,
            cors: true,
        }
    }
}

/// Result cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum cached responses (0 disables the cache)
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Extension table configuration.
///
/// `replace` swaps out the built-in table entirely; `overrides` is layered
/// on top of whichever table is in effect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguagesConfig {
    pub replace: Option<HashMap<String, String>>,
    pub overrides: HashMap<String, String>,
}

impl LanguagesConfig {
    /// Builds the language map this section describes.
    pub fn language_map(&self) -> LanguageMap {
        let base = match &self.replace {
            Some(table) => LanguageMap::from_entries(table.iter().map(|(k, v)| (k, v.clone()))),
            None => LanguageMap::default(),
        };
        base.with_overrides(self.overrides.iter().map(|(k, v)| (k, v.clone())))
    }
}

/// Markup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    /// Prefix for generated CSS classes
    pub class_prefix: String,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            class_prefix: linelight_syntax::DEFAULT_CLASS_PREFIX.to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.cache.capacity, 500);
        assert_eq!(config.markup.class_prefix, "hljs-");
        assert_eq!(config.server.bind_address(), "127.0.0.1:3001");
    }

    #[test]
    fn test_partial_config() {
        let config: Config = toml::from_str("[cache]\ncapacity = 42\n").unwrap();
        assert_eq!(config.cache.capacity, 42);
        assert_eq!(config.server.port, 3001);
    }

    #[test]
    fn test_language_overrides() {
        let config: Config = toml::from_str(
            r#"
            [languages]
            overrides = { h = "cpp", tpl = "handlebars" }
            "#,
        )
        .unwrap();

        let map = config.languages.language_map();
        assert_eq!(map.resolve("x.h"), Some("cpp"));
        assert_eq!(map.resolve("x.tpl"), Some("handlebars"));
        assert_eq!(map.resolve("x.py"), Some("python"));
    }

    #[test]
    fn test_language_replace() {
        let config: Config = toml::from_str(
            r#"
            [languages.replace]
            py = "python3"
            "#,
        )
        .unwrap();

        let map = config.languages.language_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map.resolve("x.py"), Some("python3"));
        assert_eq!(map.resolve("x.rs"), None);
    }

    #[test]
    fn test_serialized_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.server.port = 8080;
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.server.port, 8080);
        assert_eq!(loaded.cache.capacity, config.cache.capacity);
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[cache]\ncapacity = \"many\"\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }
}

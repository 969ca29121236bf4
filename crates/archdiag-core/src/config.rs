//! Tool configuration (`archdiag.toml`).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for archdiag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding one subdirectory per project (default: `projects`).
    #[serde(default)]
    pub projects_dir: Option<PathBuf>,

    /// Project used when none is given on the command line.
    #[serde(default)]
    pub default_project: Option<String>,

    /// Output file path (default: `workspace.dsl`).
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Exporter key (default: `structurizr`).
    #[serde(default)]
    pub exporter: Option<String>,

    /// Tagging strategies applied in order.
    #[serde(default)]
    pub tagging: Vec<String>,

    /// Prune the model to what the selected views reference.
    #[serde(default)]
    pub prune_to_views: bool,

    /// Result cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// View generator invocation.
    #[serde(default)]
    pub view_generator: Option<ViewGeneratorConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Projects directory, defaulting to `projects`.
    #[must_use]
    pub fn projects_dir(&self) -> PathBuf {
        self.projects_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("projects"))
    }

    /// Output path, defaulting to `workspace.dsl`.
    #[must_use]
    pub fn output(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from("workspace.dsl"))
    }

    /// Exporter key, defaulting to `structurizr`.
    #[must_use]
    pub fn exporter(&self) -> &str {
        self.exporter.as_deref().unwrap_or("structurizr")
    }
}

/// `[cache]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether results are cached.
    #[serde(default)]
    pub enabled: bool,

    /// Cache directory.
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_cache_dir(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".archdiag-cache")
}

/// `[view_generator]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewGeneratorConfig {
    /// Generator key.
    pub name: String,

    /// Generator-specific options, passed through as JSON.
    #[serde(default)]
    pub config: toml::Table,
}

impl ViewGeneratorConfig {
    /// Options converted to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML table holds values JSON cannot represent.
    pub fn config_json(&self) -> Result<serde_json::Value, ConfigError> {
        serde_json::to_value(&self.config).map_err(|e| ConfigError::Parse {
            message: format!("view_generator.config: {e}"),
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.projects_dir(), PathBuf::from("projects"));
        assert_eq!(config.output(), PathBuf::from("workspace.dsl"));
        assert_eq!(config.exporter(), "structurizr");
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.dir, PathBuf::from(".archdiag-cache"));
    }

    #[test]
    fn parses_full_config() {
        let config = Config::parse(
            r#"
projects_dir = "arch"
default_project = "shop"
output = "out/shop.dsl"
exporter = "json"
tagging = ["auto_external", "auto_broker_queue"]
prune_to_views = true

[cache]
enabled = true
dir = "/tmp/archdiag"

[view_generator]
name = "delta_lineage"

[view_generator.config]
name = "QueueMigration"
before = { system = "Shop", container = "Kafka" }
"#,
        )
        .unwrap();
        assert_eq!(config.default_project.as_deref(), Some("shop"));
        assert_eq!(config.tagging.len(), 2);
        assert!(config.prune_to_views);
        assert!(config.cache.enabled);
        let generator = config.view_generator.unwrap();
        assert_eq!(generator.name, "delta_lineage");
        let json = generator.config_json().unwrap();
        assert_eq!(json["before"]["container"], "Kafka");
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        assert!(matches!(
            Config::parse("tagging = ["),
            Err(ConfigError::Parse { .. })
        ));
    }
}

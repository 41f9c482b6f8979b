//! # rootwalk configuration
//!
//! File-based configuration for the rootwalk resolver. YAML is the default
//! format; JSON and TOML are picked by file extension. Every field has a
//! default, so an empty file is a valid configuration, and command-line
//! flags override whatever the file says.

use rootwalk_metrics::tracing_setup::{LogConfig, LogFormat, parse_level};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub mod resolver;

pub use resolver::ResolverSection;

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("File not found: {0}")]
    NotFound(PathBuf),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Resolution limits and network settings.
    pub resolver: ResolverSection,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Loads configuration from a file, choosing the format by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;

        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => serde_yaml::from_str(&content)?, // Default to YAML
        };

        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.resolver.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Serializes to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Returns the first configuration file found on the search path.
///
/// Looks at `./rootwalk.yaml`, then `/etc/rootwalk/config.yaml`, then
/// `rootwalk/config.yaml` under the user's configuration directory.
pub fn find_config_file() -> Option<PathBuf> {
    search_path().into_iter().find(|path| {
        let found = path.is_file();
        debug!(path = %path.display(), found, "Checked config location");
        found
    })
}

fn search_path() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("rootwalk.yaml"),
        PathBuf::from("/etc/rootwalk/config.yaml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("rootwalk").join("config.yaml"));
    }
    paths
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,

    /// Log format (text, json).
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "text".to_string(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<()> {
        const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "warning", "error"];
        if !LEVELS.contains(&self.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                message: format!("unknown level '{}'", self.level),
            });
        }

        if !matches!(self.format.to_ascii_lowercase().as_str(), "text" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "logging.format".to_string(),
                message: "must be text or json".to_string(),
            });
        }

        Ok(())
    }

    /// Converts to the subscriber settings.
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            level: parse_level(&self.level),
            format: LogFormat::parse(&self.format),
            span_events: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tracing::Level;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.resolver.max_hops, 16);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = Config::default();
        config.resolver.seed = Some(7);
        let yaml = config.to_yaml().unwrap();
        assert_eq!(Config::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("resolver:\n  max_hops: 8\n").unwrap();
        assert_eq!(config.resolver.max_hops, 8);
        assert_eq!(config.resolver.query_timeout_ms, 5000);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
        assert_eq!(Config::from_yaml("\n").unwrap(), Config::default());
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json = dir.path().join("rootwalk.json");
        std::fs::write(&json, r#"{"resolver": {"port": 5353}}"#).unwrap();
        assert_eq!(Config::from_file(&json).unwrap().resolver.port, 5353);

        let toml = dir.path().join("rootwalk.toml");
        let mut file = std::fs::File::create(&toml).unwrap();
        writeln!(file, "[resolver]\nseed = 99\n\n[logging]\nformat = \"json\"").unwrap();
        let config = Config::from_file(&toml).unwrap();
        assert_eq!(config.resolver.seed, Some(99));
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/nonexistent/rootwalk.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_invalid_logging_rejected() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "logging.level"
        ));
    }

    #[test]
    fn test_log_config_conversion() {
        let logging = LoggingConfig {
            level: "debug".to_string(),
            format: "JSON".to_string(),
        };
        let log = logging.to_log_config();
        assert_eq!(log.level, Level::DEBUG);
        assert_eq!(log.format, LogFormat::Json);
    }
}

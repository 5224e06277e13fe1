//! Configuration module for filerepo.

use serde::Deserialize;
use std::path::Path;

use crate::repository::{DEFAULT_CLASSIFY_LIMIT, DEFAULT_MAX_EDIT_SIZE, DEFAULT_TEXT_RATIO};
use crate::{RepoError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the storage root directory.
    #[serde(default = "default_storage_root")]
    pub root: String,
    /// Maximum file size (bytes) that may be opened for editing.
    #[serde(default = "default_max_edit_size")]
    pub max_edit_size: u64,
    /// Number of leading bytes examined by the text classifier.
    #[serde(default = "default_classify_limit")]
    pub classify_limit: usize,
    /// Minimum share of printable characters for a file to count as text.
    #[serde(default = "default_text_ratio")]
    pub text_ratio: f64,
    /// Whether listings classify files as text or binary.
    #[serde(default = "default_classify_text")]
    pub classify_text: bool,
}

fn default_storage_root() -> String {
    "files".to_string()
}

fn default_max_edit_size() -> u64 {
    DEFAULT_MAX_EDIT_SIZE
}

fn default_classify_limit() -> usize {
    DEFAULT_CLASSIFY_LIMIT
}

fn default_text_ratio() -> f64 {
    DEFAULT_TEXT_RATIO
}

fn default_classify_text() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            max_edit_size: default_max_edit_size(),
            classify_limit: default_classify_limit(),
            text_ratio: default_text_ratio(),
            classify_text: default_classify_text(),
        }
    }
}

/// Web API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Maximum upload size in megabytes (0 = unlimited).
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_max_upload_size() -> u64 {
    100
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec![],
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/filerepo.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Web API configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(RepoError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| RepoError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FILEREPO_STORAGE_ROOT`: Override the storage root directory
    /// - `FILEREPO_PORT`: Override the listen port
    ///
    /// Valid overrides are always applied. An unparseable port is reported as
    /// an error and leaves the configured port in place.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(root) = std::env::var("FILEREPO_STORAGE_ROOT") {
            if !root.is_empty() {
                self.storage.root = root;
            }
        }

        if let Ok(port) = std::env::var("FILEREPO_PORT") {
            self.server.port = port.trim().parse().map_err(|_| {
                RepoError::Config(format!("invalid FILEREPO_PORT value: {port:?}"))
            })?;
        }

        Ok(())
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The storage root is empty
    /// - `text_ratio` is outside `0.0..=1.0`
    pub fn validate(&self) -> Result<()> {
        if self.storage.root.trim().is_empty() {
            return Err(RepoError::Config("storage.root must not be empty".to_string()));
        }
        if !(0.0..=1.0).contains(&self.storage.text_ratio) {
            return Err(RepoError::Config(format!(
                "storage.text_ratio must be between 0 and 1, got {}",
                self.storage.text_ratio
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);

        assert_eq!(config.storage.root, "files");
        assert_eq!(config.storage.max_edit_size, 16384);
        assert_eq!(config.storage.classify_limit, 1024 * 1024);
        assert_eq!(config.storage.text_ratio, 0.75);
        assert!(config.storage.classify_text);

        assert!(config.web.cors_origins.is_empty());
        assert_eq!(config.web.max_upload_size_mb, 100);

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/filerepo.log");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 8080

[storage]
root = "/srv/files"
max_edit_size = 2048
classify_limit = 4096
text_ratio = 0.9
classify_text = false

[web]
cors_origins = ["http://localhost:5173"]
max_upload_size_mb = 0

[logging]
level = "debug"
file = "custom/logs/app.log"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);

        assert_eq!(config.storage.root, "/srv/files");
        assert_eq!(config.storage.max_edit_size, 2048);
        assert_eq!(config.storage.classify_limit, 4096);
        assert_eq!(config.storage.text_ratio, 0.9);
        assert!(!config.storage.classify_text);

        assert_eq!(config.web.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.web.max_upload_size_mb, 0);

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/logs/app.log");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[storage]
max_edit_size = 4096
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.storage.max_edit_size, 4096);
        assert_eq!(config.storage.root, "files");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.storage.root, "files");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        if let Err(RepoError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");
        assert!(matches!(result, Err(RepoError::Io(_))));
    }

    #[test]
    fn test_apply_env_overrides() {
        let original_root = std::env::var("FILEREPO_STORAGE_ROOT").ok();
        let original_port = std::env::var("FILEREPO_PORT").ok();

        std::env::set_var("FILEREPO_STORAGE_ROOT", "/tmp/env-root");
        std::env::set_var("FILEREPO_PORT", "not-a-port");

        let mut config = Config::default();
        let result = config.apply_env_overrides();

        assert!(matches!(result, Err(RepoError::Config(ref msg)) if msg.contains("FILEREPO_PORT")));
        assert_eq!(config.storage.root, "/tmp/env-root");
        // Invalid port leaves the default in place
        assert_eq!(config.server.port, 3000);

        std::env::set_var("FILEREPO_PORT", "8080");
        config.apply_env_overrides().unwrap();
        assert_eq!(config.server.port, 8080);

        match original_root {
            Some(val) => std::env::set_var("FILEREPO_STORAGE_ROOT", val),
            None => std::env::remove_var("FILEREPO_STORAGE_ROOT"),
        }
        match original_port {
            Some(val) => std::env::set_var("FILEREPO_PORT", val),
            None => std::env::remove_var("FILEREPO_PORT"),
        }
    }

    #[test]
    fn test_validate_text_ratio_out_of_range() {
        let mut config = Config::default();
        config.storage.text_ratio = 1.5;

        let result = config.validate();
        if let Err(RepoError::Config(msg)) = result {
            assert!(msg.contains("text_ratio"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_validate_empty_root() {
        let mut config = Config::default();
        config.storage.root = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_default() {
        assert!(Config::default().validate().is_ok());
    }
}

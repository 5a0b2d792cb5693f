//! Runtime configuration.
//!
//! Values are layered, later layers winning: built-in defaults, an optional
//! TOML file, `ROWGUARD_*` environment variables, then command-line flags
//! (applied by the CLI).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::ReportFormat;

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads the process environment.
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

pub const ENV_SCHEMA: &str = "ROWGUARD_SCHEMA";
pub const ENV_HOST: &str = "ROWGUARD_HOST";
pub const ENV_PORT: &str = "ROWGUARD_PORT";
pub const ENV_LOG: &str = "ROWGUARD_LOG";
pub const ENV_LOG_FORMAT: &str = "ROWGUARD_LOG_FORMAT";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// The schema document every record is validated against
    pub schema_path: PathBuf,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub output: OutputConfig,
}

/// HTTP adapter settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted upload, in bytes
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive such as `info` or `rowguard=debug`
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Report settings for the command-line driver
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub format: ReportFormat,
    /// Validate records on the rayon pool
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_path: PathBuf::from("cre-json-schema.json"),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("validation_results.csv"),
            format: ReportFormat::Csv,
            parallel: false,
        }
    }
}

impl Config {
    /// Builds the configuration from defaults, an optional file and the
    /// environment. Command-line overrides are applied by the caller, which
    /// must then call [`validate`](Self::validate).
    pub fn load(path: Option<&Path>, env: &impl EnvProvider) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_environment(env)
    }

    /// Reads a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Ok(toml::from_str(&content)?)
    }

    /// Applies `ROWGUARD_*` overrides.
    pub fn apply_environment(mut self, env: &impl EnvProvider) -> Result<Self> {
        if let Some(schema) = env.get(ENV_SCHEMA) {
            self.schema_path = PathBuf::from(schema);
        }

        if let Some(host) = env.get(ENV_HOST) {
            self.server.host = host;
        }

        if let Some(port) = env.get(ENV_PORT) {
            self.server.port = port.parse().map_err(|_| {
                ConfigError::Environment(format!("Invalid {} value: {}", ENV_PORT, port))
            })?;
        }

        if let Some(level) = env.get(ENV_LOG) {
            self.logging.level = level;
        }

        if let Some(format) = env.get(ENV_LOG_FORMAT) {
            self.logging.format = match format.to_lowercase().as_str() {
                "text" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ConfigError::Environment(format!(
                        "Invalid {} value: {}",
                        ENV_LOG_FORMAT, format
                    )));
                }
            };
        }

        Ok(self)
    }

    /// Rejects settings no run could work with.
    pub fn validate(&self) -> Result<()> {
        if self.schema_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "schema_path must not be empty".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port must be greater than 0".to_string(),
            ));
        }

        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::Validation(
                "server.max_upload_bytes must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

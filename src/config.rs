//! Client configuration.
//!
//! The server endpoint and log level come from built-in defaults, an optional
//! TOML file, and command-line overrides, in increasing order of precedence.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Chat server used when nothing else is configured.
pub const DEFAULT_HOST: &str = "datakomm.work";

/// TCP port used when nothing else is configured.
pub const DEFAULT_PORT: u16 = 1300;

/// Address of a chat server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Endpoint {
    /// Hostname or IP address
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive, e.g. `info` or `chat_rs=debug`
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Contents of a TOML configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FileConfig {
    /// `[server]` section
    #[serde(default)]
    pub server: Endpoint,
    /// `[logging]` section
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FileConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::TomlParse(None, e))
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?;
        toml::from_str(&contents).map_err(|e| ConfigError::TomlParse(Some(path.to_path_buf()), e))
    }

    /// Apply command-line overrides on top of the file values.
    pub fn resolve(self, overrides: Overrides) -> Config {
        Config {
            endpoint: Endpoint {
                host: overrides.host.unwrap_or(self.server.host),
                port: overrides.port.unwrap_or(self.server.port),
            },
            log_level: overrides.log_level.unwrap_or(self.logging.level),
        }
    }
}

/// Values given on the command line; `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Server hostname
    pub host: Option<String>,
    /// Server port
    pub port: Option<u16>,
    /// Log filter
    pub log_level: Option<String>,
}

/// Final resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Chat server to connect to
    pub endpoint: Endpoint,
    /// Default log filter
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        FileConfig::default().resolve(Overrides::default())
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Configuration loading errors.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read
    FileRead(PathBuf, std::io::Error),
    /// The file is not valid TOML for [`FileConfig`]
    TomlParse(Option<PathBuf>, toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(Some(path), e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(None, e) => write!(f, "Failed to parse config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

//! Configuration loading and settings resolution
//!
//! Every setting follows the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{Error, Result};

pub const CONFIG_ENV: &str = "BIRDCAST_CONFIG";
pub const BIND_ENV: &str = "BIRDCAST_BIND";
pub const PORT_ENV: &str = "BIRDCAST_PORT";
pub const CACHE_DIR_ENV: &str = "BIRDCAST_CACHE_DIR";

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const PRESENCE_CACHE_FILE: &str = "presence_model.json";
pub const LOCATION_CACHE_FILE: &str = "location_model.json";
pub const BEST_TIME_CACHE_FILE: &str = "best_time_model.json";

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub models: ModelsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Bundle cache location and download URLs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub cache_dir: Option<PathBuf>,
    pub presence_url: Option<String>,
    pub location_url: Option<String>,
    pub best_time_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse a config file; a malformed file is an error
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load the config file named by `explicit`, `BIRDCAST_CONFIG` or the
    /// platform default, in that order
    ///
    /// A missing file yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => std::env::var_os(CONFIG_ENV)
                .map(PathBuf::from)
                .or_else(default_config_path),
        };

        match path {
            Some(path) if path.exists() => {
                info!("Loading config from {}", path.display());
                Self::from_file(&path)
            }
            Some(path) => {
                warn!("Config file {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            None => {
                warn!("Could not determine config directory, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub cache_dir: Option<PathBuf>,
}

/// Where one bundle lives locally and where to fetch it from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSource {
    pub name: &'static str,
    pub path: PathBuf,
    pub url: Option<String>,
}

/// Fully resolved service settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind: String,
    pub port: u16,
    pub cache_dir: PathBuf,
    pub log_level: String,
    pub presence: ModelSource,
    pub location: ModelSource,
    pub best_time: ModelSource,
}

impl Settings {
    pub fn resolve(cli: CliOverrides, toml: TomlConfig) -> Result<Self> {
        let bind = match cli.bind {
            Some(bind) => bind,
            None => env_string(BIND_ENV).unwrap_or(toml.server.bind),
        };

        let port = match cli.port {
            Some(port) => port,
            None => match env_string(PORT_ENV) {
                Some(raw) => raw.parse().map_err(|_| {
                    Error::Config(format!("{} is not a valid port: '{}'", PORT_ENV, raw))
                })?,
                None => toml.server.port,
            },
        };

        let cache_dir = cli
            .cache_dir
            .or_else(|| std::env::var_os(CACHE_DIR_ENV).map(PathBuf::from))
            .or(toml.models.cache_dir)
            .unwrap_or_else(default_cache_dir);

        let source = |name: &'static str, file: &str, url: Option<String>| ModelSource {
            name,
            path: cache_dir.join(file),
            url,
        };
        let presence = source("presence", PRESENCE_CACHE_FILE, toml.models.presence_url);
        let location = source("location", LOCATION_CACHE_FILE, toml.models.location_url);
        let best_time = source("best_time", BEST_TIME_CACHE_FILE, toml.models.best_time_url);

        Ok(Self {
            bind,
            port,
            log_level: toml.logging.level,
            presence,
            location,
            best_time,
            cache_dir,
        })
    }

    pub fn sources(&self) -> [&ModelSource; 3] {
        [&self.presence, &self.location, &self.best_time]
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Platform config file path (`~/.config/birdcast/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("birdcast").join("config.toml"))
}

/// Platform cache directory for downloaded bundles
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join("birdcast"))
        .unwrap_or_else(|| PathBuf::from("./birdcast_cache"))
}

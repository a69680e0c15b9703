//! Configuration management for modmap
//!
//! Settings are loaded from environment variables with defaults.
//!
//! # Environment Variables
//!
//! - `MODMAP_CACHE_DIR`: Directory holding the spider dump and the modulemap - default: "/var/cache/lmod"
//! - `MODMAP_CLUSTER_CONFIG`: YAML cluster configuration file - optional
//! - `MODMAP_LOG_LEVEL`: Logging level - default: "info"
//! - `MODMAP_LOG_JSON`: Emit JSON log lines (true|false) - default: "false"
//!
//! # Example
//!
//! ```no_run
//! use modmap::ModmapConfig;
//!
//! let config = ModmapConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("reading {}", config.spider_path().display());
//! ```

use crate::clusters::ClusterConfig;
use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_CACHE_DIR: &str = "/var/cache/lmod";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_LOG_JSON: bool = false;

/// File name of the spider dump inside the cache directory
pub const JSON_SPIDER_FILENAME: &str = "spiderT.json";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// Failed to parse configuration value
    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },

    /// Configuration file could not be read
    #[error("Failed to read {}: {error}", path.display())]
    ReadError { path: PathBuf, error: String },
}

/// Main configuration structure for modmap
///
/// `Default::default()` loads from environment variables with fallback defaults.
#[derive(Debug, Clone)]
pub struct ModmapConfig {
    /// Directory with `spiderT.json` and `modulemap.json`
    pub cache_dir: PathBuf,

    /// Optional YAML cluster configuration
    pub cluster_config: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// JSON log output
    pub log_json: bool,
}

impl Default for ModmapConfig {
    fn default() -> Self {
        let cache_dir = env::var("MODMAP_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CACHE_DIR));

        let cluster_config = env::var("MODMAP_CLUSTER_CONFIG")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let log_level = env::var("MODMAP_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let log_json = env::var("MODMAP_LOG_JSON")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(DEFAULT_LOG_JSON);

        Self {
            cache_dir,
            cluster_config,
            log_level,
            log_json,
        }
    }
}

impl ModmapConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` for an empty cache directory or
    /// an unknown log level
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Cache directory must not be empty".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    /// Path of the spider dump to convert
    pub fn spider_path(&self) -> PathBuf {
        self.cache_dir.join(JSON_SPIDER_FILENAME)
    }

    /// Path the modulemap is written to
    pub fn modulemap_path(&self) -> PathBuf {
        self.cache_dir.join(crate::store::JSON_MODULEMAP_FILENAME)
    }

    /// Loads the cluster configuration, or an empty one when none is set
    pub fn load_cluster_config(&self) -> Result<ClusterConfig, ConfigError> {
        match &self.cluster_config {
            Some(path) => ClusterConfig::load(path),
            None => Ok(ClusterConfig::default()),
        }
    }
}

impl fmt::Display for ModmapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Modmap Configuration:")?;
        writeln!(f, "  Cache Dir: {}", self.cache_dir.display())?;
        if let Some(ref path) = self.cluster_config {
            writeln!(f, "  Cluster Config: {}", path.display())?;
        }
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Log JSON: {}", self.log_json)?;
        Ok(())
    }
}

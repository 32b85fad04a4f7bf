// src/config.rs

//! Optional TOML configuration
//!
//! ```toml
//! timeout_secs = 60
//! output_dir = "/var/cache/godeb"
//! tar_dialect = "gnu"
//!
//! [[sources]]
//! url = "https://go.dev/dl/?mode=json&include=all"
//! kind = "json"
//! ```

use crate::error::{Error, Result};
use crate::releases::ReleaseSource;
use crate::translate::TarDialect;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where to look for releases
    pub sources: Vec<ReleaseSource>,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
    /// Directory packages are written to
    pub output_dir: PathBuf,
    /// Header layout of the data member
    pub tar_dialect: TarDialect,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: vec![ReleaseSource::default()],
            timeout_secs: 30,
            output_dir: PathBuf::from("."),
            tar_dialect: TarDialect::default(),
        }
    }
}

impl Config {
    /// Default location: `$XDG_CONFIG_HOME/godeb/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("godeb").join("config.toml"))
    }

    /// Load from an explicit path, or from the default path if it exists
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => {
                    debug!("No configuration file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::from_toml(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(Error::Config("at least one release source is required".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be greater than 0".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

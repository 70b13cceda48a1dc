//! Configuration management for stackvault

pub mod schema;

pub use schema::Config;

use crate::error::{StackVaultError, StackVaultResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Project-local config file name
pub const LOCAL_CONFIG_FILE: &str = "stackvault.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the global config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stackvault")
            .join("config.toml")
    }

    /// Find a project-local config file in `dir`
    pub fn find_local_config(dir: &Path) -> Option<PathBuf> {
        let candidate = dir.join(LOCAL_CONFIG_FILE);
        candidate.is_file().then_some(candidate)
    }

    /// Load configuration, using defaults if the file does not exist
    pub fn load(&self) -> StackVaultResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file {} not found, using defaults", self.config_path.display());
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path)
    }

    /// Load the local config if one is given, else this manager's file
    ///
    /// A local file replaces the global one as a whole; sections it omits
    /// take their defaults, not the global values.
    pub fn load_preferred(&self, local: Option<&Path>) -> StackVaultResult<Config> {
        match local {
            Some(path) => {
                debug!("Using local config {}", path.display());
                self.load_from_file(path)
            }
            None => self.load(),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file(&self, path: &Path) -> StackVaultResult<Config> {
        let content = fs::read_to_string(path)
            .map_err(|e| StackVaultError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| StackVaultError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

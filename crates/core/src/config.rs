//! Application configuration.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::DealershipHeader;

/// Directory under `~/.config` holding the configuration file.
pub const DEFAULT_CONFIG_DIR: &str = "dealership";
/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.json";
/// Prefix for environment overrides, e.g. `DEALERSHIP_INVENTORY_PATH`.
pub const ENV_PREFIX: &str = "DEALERSHIP";

/// Settings needed to open the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Inventory file, relative paths resolve against the working directory.
    pub inventory_path: PathBuf,
    /// Dealership name used when the inventory has no usable header.
    pub fallback_name: String,
    /// Address used when the inventory has no usable header.
    pub fallback_address: String,
    /// Phone number used when the inventory has no usable header.
    pub fallback_phone: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            inventory_path: PathBuf::from("inventory.csv"),
            fallback_name: "Default_Name".to_string(),
            fallback_address: "Default_Address".to_string(),
            fallback_phone: "Default_Phone".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration from `path` (if it exists) and the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path.as_ref(), Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with(path: &Path, environment: Environment) -> Result<Self> {
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default(
                "inventory_path",
                defaults.inventory_path.to_string_lossy().to_string(),
            )?
            .set_default("fallback_name", defaults.fallback_name)?
            .set_default("fallback_address", defaults.fallback_address)?
            .set_default("fallback_phone", defaults.fallback_phone)?
            .add_source(File::from(path).required(false))
            .add_source(environment)
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;

        settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    /// Header adopted when the inventory's own header is unusable.
    pub fn fallback_header(&self) -> DealershipHeader {
        DealershipHeader::new(
            self.fallback_name.clone(),
            self.fallback_address.clone(),
            self.fallback_phone.clone(),
        )
    }

    /// Persist configuration to the given file, creating parent directories if needed.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create config directory {}", parent.display())
            })?;
        }

        let serialized =
            serde_json::to_string_pretty(self).context("failed to serialize configuration")?;
        fs::write(path, serialized)
            .with_context(|| format!("failed to write config {}", path.display()))
    }
}

/// Default location of the configuration file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_CONFIG_DIR)
        .join(CONFIG_FILE_NAME)
}

/// Write a default configuration file unless one already exists.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    ensure_default_config_at(&path)?;
    Ok(path)
}

/// Write a default configuration file at `path` unless one already exists.
pub fn ensure_default_config_at(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    info!("writing default configuration to {}", path.display());
    AppConfig::default().persist(path)
}

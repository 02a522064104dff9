//! Store configuration.
//!
//! Loaded from TOML by the embedding application:
//!
//! ```toml
//! instance = "oresat0"
//! data_dir = "/var/lib/uplink"
//! secret_file = "hmac.key"
//! bootstrap = "file"          # or "placeholder"
//! persistence = "on_shutdown" # or "every_advance"
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::ConfigError;

/// Where the shared secret comes from when none is stored yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapPolicy {
    /// Read the first line of the secret file; startup fails if it is
    /// missing or empty
    #[default]
    File,
    /// Use the fixed placeholder secret
    /// ([`crate::store::PLACEHOLDER_SECRET`])
    Placeholder,
}

/// When the sequence counter is written back to durable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistencePolicy {
    /// Only on clean shutdown; a crash loses advances since startup
    #[default]
    OnShutdown,
    /// After every advance, in addition to shutdown
    EveryAdvance,
}

/// Configuration for one store instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Instance identifier; namespaces the durable keys
    pub instance: String,
    /// Directory holding the secret file and the database (default `.`)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Secret file name, relative to `data_dir` (default `hmac.key`)
    #[serde(default = "default_secret_file")]
    pub secret_file: String,
    /// Secret bootstrap policy
    #[serde(default)]
    pub bootstrap: BootstrapPolicy,
    /// Counter persistence policy
    #[serde(default)]
    pub persistence: PersistencePolicy,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_secret_file() -> String {
    "hmac.key".to_string()
}

impl StoreConfig {
    /// Name of the embedded database file inside `data_dir`.
    pub const DATABASE_FILE: &'static str = "env.redb";

    /// Configuration with defaults for everything but instance and directory.
    pub fn new(instance: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            instance: instance.into(),
            data_dir: data_dir.into(),
            secret_file: default_secret_file(),
            bootstrap: BootstrapPolicy::default(),
            persistence: PersistencePolicy::default(),
        }
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_toml(&content)
    }

    /// Reject values no store could run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instance.trim().is_empty() {
            return Err(ConfigError::Invalid("instance must not be empty"));
        }
        if self.bootstrap == BootstrapPolicy::File && self.secret_file.trim().is_empty() {
            return Err(ConfigError::Invalid("secret_file must be set for file bootstrap"));
        }
        Ok(())
    }

    /// Full path of the bootstrap secret file.
    pub fn secret_path(&self) -> PathBuf {
        self.data_dir.join(&self.secret_file)
    }

    /// Full path of the embedded database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(Self::DATABASE_FILE)
    }
}

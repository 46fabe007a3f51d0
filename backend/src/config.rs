//! Server configuration.
//!
//! Values come from the built-in defaults, then an optional YAML file named by
//! `MATCH_REGISTRATION_CONFIG`, then individual environment variables.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use shared::FieldInfo;
use std::fs;
use std::path::Path;

use crate::domain::DEFAULT_MAX_RETRIES;
use crate::storage::sqlite::DEFAULT_DATABASE_URL;

pub const CONFIG_PATH_VAR: &str = "MATCH_REGISTRATION_CONFIG";
pub const BIND_ADDRESS_VAR: &str = "MATCH_REGISTRATION_BIND";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const STORAGE_VAR: &str = "MATCH_REGISTRATION_STORAGE";
pub const MAX_RETRIES_VAR: &str = "MATCH_REGISTRATION_MAX_RETRIES";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            other => bail!("Unknown storage backend '{}', expected sqlite or memory", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_address: String,
    pub database_url: String,
    pub storage: StorageBackend,
    /// Retries after a conflicting admission commit before answering "contention"
    pub max_admission_retries: u32,
    /// Origin the browser frontend is served from
    pub allowed_origin: String,
    /// Venue details served to families; missing keys keep their defaults
    pub field_info: FieldInfo,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            storage: StorageBackend::Sqlite,
            max_admission_retries: DEFAULT_MAX_RETRIES,
            allowed_origin: "http://localhost:8080".to_string(),
            field_info: FieldInfo::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::load_from(|name| std::env::var(name).ok())
    }

    /// Load configuration using `lookup` to read environment variables
    pub fn load_from<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_PATH_VAR) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(bind_address) = lookup(BIND_ADDRESS_VAR) {
            config.bind_address = bind_address;
        }
        if let Some(database_url) = lookup(DATABASE_URL_VAR) {
            config.database_url = database_url;
        }
        if let Some(storage) = lookup(STORAGE_VAR) {
            config.storage = storage.parse()?;
        }
        if let Some(retries) = lookup(MAX_RETRIES_VAR) {
            config.max_admission_retries = retries
                .trim()
                .parse()
                .with_context(|| format!("{} must be a non-negative integer, got '{}'", MAX_RETRIES_VAR, retries))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse config YAML: {:?}", path))
    }

    fn validate(&self) -> Result<()> {
        if self.bind_address.trim().is_empty() {
            bail!("bind_address cannot be empty");
        }
        if self.storage == StorageBackend::Sqlite && self.database_url.trim().is_empty() {
            bail!("database_url is required for sqlite storage");
        }
        Ok(())
    }
}

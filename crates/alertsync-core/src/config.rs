//! Configuration management for alertsync

use std::path::Path;

use config::{Config as ConfigLoader, Environment, File};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Dashboard API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Backup configuration
    #[serde(default)]
    pub backup: BackupConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            backup: BackupConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional file and the environment.
    ///
    /// When `path` is given the file must exist; otherwise an `alertsync.toml`
    /// (or `.yaml`/`.json`) in the working directory is picked up if present.
    /// Environment variables prefixed with `ALERTSYNC_` override file values,
    /// with `__` separating sections, e.g. `ALERTSYNC_API__TIMEOUT_SECS=60`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ConfigLoader::builder();

        builder = match path {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name("alertsync").required(false)),
        };

        let loaded = builder
            .add_source(Environment::with_prefix("ALERTSYNC").separator("__"))
            .build()
            .map_err(|e| Error::config(e.to_string()))?;

        loaded
            .try_deserialize()
            .map_err(|e| Error::config(e.to_string()))
    }
}

/// Dashboard API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the Dashboard API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Page size for paginated list endpoints
    pub per_page: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.meraki.com/api/v1".to_string(),
            timeout_secs: 30,
            per_page: 1000,
        }
    }
}

/// Backup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Directory that per-run backup subdirectories are created under
    pub root_dir: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            root_dir: "alert_backups".to_string(),
        }
    }
}

/// Load an alert-settings document from a JSON file.
///
/// The document is kept as raw JSON so that any field combination the
/// Dashboard accepts can pass through unchanged. The only requirement is a
/// JSON object at the top level.
pub fn load_alert_document(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)?;
    let doc: Value = serde_json::from_str(&raw)?;

    if !doc.is_object() {
        return Err(Error::config(format!(
            "alert settings file {} must contain a JSON object at the top level",
            path.display()
        )));
    }

    Ok(doc)
}

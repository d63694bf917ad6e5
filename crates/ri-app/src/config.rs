//! Application configuration
//!
//! Read from an optional TOML file; environment variables override the file.

use std::fs;
use std::path::{Path, PathBuf};
use ri_data::{BackendConfig, IngestConfig};
use ri_llm::ModelConfig;
use ri_views::ChartConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub ingest: IngestConfig,
    pub model: ModelConfig,
    pub charts: ChartConfig,
}

impl AppConfig {
    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// File settings (or defaults) with the process environment applied
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override settings from environment-style variables
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = lookup("RI_DATABASE_PATH") {
            debug!("Database path from environment");
            self.backend.database_path = PathBuf::from(path);
        }
        if let Some(url) = lookup("RI_MODEL_BASE_URL") {
            self.model.base_url = url;
        }
        if let Some(model) = lookup("RI_MODEL_NAME") {
            self.model.model = model;
        }
        if let Some(key) = lookup("RI_MODEL_API_KEY").or_else(|| lookup("OPENAI_API_KEY")) {
            self.model.api_key = Some(key);
        }
    }
}

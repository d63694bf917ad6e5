//! Relational backend configuration

use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};

/// Path value that selects a private in-memory database
pub const IN_MEMORY: &str = ":memory:";

/// Where the shared backend lives and how it behaves
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// SQLite database file, or `:memory:`
    pub database_path: PathBuf,

    /// Create the database file (and its directory) on first use
    pub create_if_missing: bool,

    /// Number of rows included in a schema descriptor
    pub sample_rows: usize,

    /// Reject generated statements that would modify the database
    pub read_only_queries: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/retail_data.db"),
            create_if_missing: true,
            sample_rows: 3,
            read_only_queries: false,
        }
    }
}

impl BackendConfig {
    /// Configuration for a file-backed database
    pub fn new(database_path: impl AsRef<Path>) -> Self {
        Self {
            database_path: database_path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Configuration for an in-memory database
    pub fn in_memory() -> Self {
        Self::new(IN_MEMORY)
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY
    }

    /// Human readable location, used in logs
    pub fn location(&self) -> String {
        self.database_path.display().to_string()
    }
}

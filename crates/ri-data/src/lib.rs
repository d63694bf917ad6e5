//! Ingestion, storage and query dispatch for uploaded retail data

pub mod config;
pub mod dispatch;
pub mod result;
pub mod schema;
pub mod sources;
pub mod table;

use arrow::error::ArrowError;
use thiserror::Error;

// Re-exports
pub use config::{BackendConfig, IngestConfig};
pub use dispatch::{QueryDispatcher, Route};
pub use result::ResultSet;
pub use sources::{Backend, CsvIngestor, Dialect, Sniffer, TableStore, Upload};
pub use table::TypedTable;

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    /// The upload could not be turned into a table
    #[error("Failed to ingest '{file}': {cause}")]
    Ingestion { file: String, cause: String },

    /// Connection, DDL or DML failure in the relational backend
    #[error("Backend error: {0}")]
    Backend(String),

    /// A generated query failed; carries the offending text
    #[error("Query failed: {message}\nQuery: {query}")]
    Query { query: String, message: String },

    /// A query names a table no uploaded file maps to
    #[error("Unknown table '{0}'")]
    UnknownTable(String),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    pub(crate) fn ingestion(file: &str, cause: impl ToString) -> Self {
        DataError::Ingestion {
            file: file.to_string(),
            cause: cause.to_string(),
        }
    }

    pub(crate) fn query(query: &str, cause: impl ToString) -> Self {
        DataError::Query {
            query: query.to_string(),
            message: cause.to_string(),
        }
    }
}

impl From<rusqlite::Error> for DataError {
    fn from(error: rusqlite::Error) -> Self {
        DataError::Backend(error.to_string())
    }
}

//! Backend and ingestion configuration

pub mod backend_config;
pub mod ingest_config;

pub use backend_config::*;
pub use ingest_config::*;

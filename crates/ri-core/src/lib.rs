//! Core data model for the retail insight pipeline
//! 
//! This crate holds the types every other crate agrees on: how uploaded
//! tables are named, how their schemas are described to the language model,
//! what a chart specification looks like and how the conversation is kept.

pub mod chart;
pub mod conversation;
pub mod naming;
pub mod schema;

// Re-export commonly used types
pub use chart::{ChartKind, ChartSpec, RenderedChart};
pub use conversation::{ChatMessage, Conversation, Role};
pub use naming::{extract_table_names, slot_for_table_name, table_name_for_slot, TABLE_PREFIX};
pub use schema::{ColumnKind, ColumnSchema, SchemaDescriptor};

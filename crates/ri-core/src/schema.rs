//! Schema descriptors handed to the language model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column classification used for DDL and prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Text,
}

impl ColumnKind {
    pub fn name(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Text => "text",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name and kind of a single column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Read-only view of a stored table: columns, kinds and a few sample rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    pub table_name: String,
    pub columns: Vec<ColumnSchema>,
    /// First rows of the table, already rendered as text
    pub sample_rows: Vec<Vec<String>>,
    pub row_count: usize,
}

impl SchemaDescriptor {
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        self.columns.iter().find(|c| c.name == name).map(|c| c.kind)
    }

    /// "column (type)" listing, one entry per column
    pub fn columns_detail(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| format!("{} ({})", c.name, c.kind))
            .collect()
    }

    /// Sample rows as a markdown table
    pub fn sample_markdown(&self) -> String {
        if self.sample_rows.is_empty() {
            return "No sample data available".to_string();
        }

        let mut out = String::new();
        out.push_str("| ");
        out.push_str(&self.column_names().join(" | "));
        out.push_str(" |\n|");
        for _ in &self.columns {
            out.push_str(":---|");
        }
        out.push('\n');
        for row in &self.sample_rows {
            let cells: Vec<String> = row.iter().map(|cell| cell.replace('|', "\\|")).collect();
            out.push_str("| ");
            out.push_str(&cells.join(" | "));
            out.push_str(" |\n");
        }
        out
    }

    /// Stable textual form used inside prompts
    pub fn to_prompt_block(&self) -> String {
        format!(
            "Table: {}\nAvailable Columns with Types:\n{}\nSample Data:\n{}\n",
            self.table_name,
            self.columns_detail().join("\n"),
            self.sample_markdown().trim_end(),
        )
    }
}

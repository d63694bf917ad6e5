//! CSV ingestion configuration

use serde::{Serialize, Deserialize};

/// Controls dialect detection and column normalisation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Normalised column names coerced to numbers
    pub numeric_columns: Vec<String>,

    /// Cell values marking a repeated header row inside the data
    pub header_tokens: Vec<String>,

    /// Delimiters tried by the sniffer, in order of preference
    pub candidate_delimiters: Vec<char>,

    /// Quote characters tried by the sniffer, in order of preference
    pub candidate_quotes: Vec<char>,

    /// Bytes of input inspected when sniffing the dialect
    pub sniff_bytes: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            numeric_columns: ["quantity", "price", "unit_price", "total_amount", "totalamount"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            header_tokens: ["order_id", "date", "product_name", "total_amount"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            candidate_delimiters: vec![',', ';', '\t', '|'],
            candidate_quotes: vec!['"', '\''],
            sniff_bytes: 64 * 1024,
        }
    }
}

impl IngestConfig {
    pub fn is_numeric_column(&self, name: &str) -> bool {
        self.numeric_columns.iter().any(|c| c == name)
    }

    /// Whether a (trimmed, lower-cased) cell is a known header token
    pub fn is_header_token(&self, cell: &str) -> bool {
        let cell = cell.trim().to_lowercase();
        self.header_tokens.iter().any(|t| *t == cell)
    }
}

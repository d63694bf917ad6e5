//! CSV ingestion: raw upload bytes to a normalised typed table

use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::config::IngestConfig;
use crate::sources::dialect::{Dialect, Sniffer};
use crate::sources::sqlite_source::IDENTITY_COLUMN;
use crate::table::{ColumnData, TypedTable};
use crate::DataError;

/// An uploaded file: name and raw contents
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Turns uploads into typed tables
pub struct CsvIngestor {
    config: IngestConfig,
    sniffer: Sniffer,
}

impl CsvIngestor {
    pub fn new(config: IngestConfig) -> Self {
        let sniffer = Sniffer::new(&config);
        Self { config, sniffer }
    }

    /// Parse an upload into a typed table named `table_name`.
    ///
    /// Fails with [`DataError::Ingestion`] when the bytes are not tabular.
    pub fn ingest(&self, upload: &Upload, table_name: &str) -> Result<TypedTable, DataError> {
        let content = decode(&upload.bytes);
        if content.trim().is_empty() {
            return Err(DataError::ingestion(&upload.name, "file is empty"));
        }

        let dialect = self.sniffer.sniff(&content);
        info!(
            "Ingesting '{}' as {} (delimiter={:?}, quote={:?})",
            upload.name, table_name, dialect.delimiter as char, dialect.quote as char
        );

        let (raw_headers, raw_rows) = read_records(&content, dialect)
            .map_err(|e| DataError::ingestion(&upload.name, e))?;

        if raw_headers.iter().all(|h| h.trim().is_empty()) {
            return Err(DataError::ingestion(&upload.name, "missing header row"));
        }

        let width = raw_headers.len();
        let mut rows = Vec::with_capacity(raw_rows.len());
        let mut dropped = 0usize;
        for (idx, row) in raw_rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(DataError::ingestion(
                    &upload.name,
                    format!(
                        "row {} has {} fields but the header has {}",
                        idx + 2,
                        row.len(),
                        width
                    ),
                ));
            }
            if row.iter().any(|cell| self.config.is_header_token(cell)) {
                dropped += 1;
                continue;
            }
            rows.push(row);
        }
        if dropped > 0 {
            warn!("Dropped {} repeated header rows from '{}'", dropped, upload.name);
        }

        let headers = normalize_headers(&raw_headers);
        debug!("Normalised columns for {}: {:?}", table_name, headers);

        let columns = headers
            .into_iter()
            .enumerate()
            .map(|(col_idx, name)| {
                let cells = rows.iter().map(|row| row.get(col_idx));
                let data = if self.config.is_numeric_column(&name) {
                    ColumnData::Numeric(
                        cells.map(|cell| cell.map(String::as_str).and_then(parse_number)).collect(),
                    )
                } else {
                    ColumnData::Text(cells.map(|cell| cell.cloned()).collect())
                };
                (name, data)
            })
            .collect();

        let table = TypedTable::from_columns(table_name, columns)
            .map_err(|e| DataError::ingestion(&upload.name, e))?;
        info!("Ingested {} rows into {}", table.num_rows(), table_name);
        Ok(table)
    }
}

impl Default for CsvIngestor {
    fn default() -> Self {
        Self::new(IngestConfig::default())
    }
}

/// UTF-8 first, lossy otherwise. A byte order mark is dropped.
fn decode(bytes: &[u8]) -> String {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    };
    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

/// Split content into a header record and data records
fn read_records(
    content: &str,
    dialect: Dialect,
) -> Result<(Vec<String>, Vec<Vec<String>>), csv::Error> {
    let mut reader = dialect.reader_builder().from_reader(content.as_bytes());
    let mut records = reader.byte_records();

    let headers = match records.next() {
        Some(record) => to_strings(&record?),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        // Blank lines made only of delimiters carry no data
        if record.iter().all(|field| field.iter().all(u8::is_ascii_whitespace)) {
            continue;
        }
        rows.push(to_strings(&record));
    }

    Ok((headers, rows))
}

fn to_strings(record: &csv::ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}

/// Trim, lower-case and replace spaces with underscores
pub fn normalize_column_name(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// Normalise every header and make the result unique
fn normalize_headers(raw: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(IDENTITY_COLUMN.to_string());

    raw.iter()
        .enumerate()
        .map(|(idx, header)| {
            let mut base = normalize_column_name(header);
            if base.is_empty() {
                base = format!("column_{}", idx + 1);
            }

            let mut name = base.clone();
            let mut suffix = 2;
            while seen.contains(&name) {
                name = format!("{}_{}", base, suffix);
                suffix += 1;
            }
            seen.insert(name.clone());
            name
        })
        .collect()
}

/// Parse a numeric cell; anything unparseable is missing
fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

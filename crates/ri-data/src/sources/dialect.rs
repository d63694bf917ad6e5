//! CSV dialect detection
//!
//! Each candidate (delimiter, quote) pair parses a sample of the input. The
//! pair whose rows have the most consistent width and the cleanest cells
//! wins. A cell is clean when it holds no other candidate delimiter and no
//! leftover quote character, which is what a wrong guess leaves behind.

use std::collections::HashMap;
use csv::{ReaderBuilder, Terminator};
use tracing::debug;

use crate::config::IngestConfig;

/// Delimiter and quote character of a CSV file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
    pub quote: u8,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
        }
    }
}

impl Dialect {
    /// CSV reader configured for this dialect
    pub fn reader_builder(&self) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .quote(self.quote)
            .double_quote(true)
            .terminator(Terminator::CRLF);
        builder
    }
}

/// Dialect sniffer
pub struct Sniffer {
    delimiters: Vec<u8>,
    quotes: Vec<u8>,
    sample_bytes: usize,
}

impl Sniffer {
    pub fn new(config: &IngestConfig) -> Self {
        Self {
            delimiters: config.candidate_delimiters.iter().filter_map(|&c| ascii(c)).collect(),
            quotes: config.candidate_quotes.iter().filter_map(|&c| ascii(c)).collect(),
            sample_bytes: config.sniff_bytes.max(1),
        }
    }

    /// Detect the dialect of `content`. Falls back to comma/double-quote when
    /// no candidate splits the sample into more than one column.
    pub fn sniff(&self, content: &str) -> Dialect {
        let sample = sample_prefix(content, self.sample_bytes);

        let mut best = Dialect::default();
        let mut best_score = 0.0f64;

        for &delimiter in &self.delimiters {
            for &quote in &self.quotes {
                let dialect = Dialect { delimiter, quote };
                let score = self.score(sample, dialect);
                debug!(
                    "Dialect candidate delimiter={:?} quote={:?} score={:.4}",
                    delimiter as char, quote as char, score
                );
                if score > best_score {
                    best_score = score;
                    best = dialect;
                }
            }
        }

        best
    }

    /// Consistency score of a candidate dialect on the sample
    fn score(&self, sample: &str, dialect: Dialect) -> f64 {
        let mut reader = dialect.reader_builder().from_reader(sample.as_bytes());

        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in reader.byte_records() {
            match record {
                Ok(record) => rows.push(
                    record
                        .iter()
                        .map(|field| String::from_utf8_lossy(field).into_owned())
                        .collect(),
                ),
                Err(_) => return 0.0,
            }
        }

        if rows.is_empty() {
            return 0.0;
        }

        pattern_score(&rows) * self.clean_fraction(&rows, dialect)
    }

    /// Fraction of cells that show no sign of a wrong split
    fn clean_fraction(&self, rows: &[Vec<String>], dialect: Dialect) -> f64 {
        let foreign: Vec<char> = self
            .delimiters
            .iter()
            .filter(|&&d| d != dialect.delimiter)
            .map(|&d| d as char)
            .collect();
        let quote = dialect.quote as char;

        let mut total = 0usize;
        let mut clean = 0usize;
        for cell in rows.iter().flatten() {
            total += 1;
            if !cell.contains(quote) && !cell.contains(|c: char| foreign.contains(&c)) {
                clean += 1;
            }
        }

        if total == 0 {
            0.0
        } else {
            clean as f64 / total as f64
        }
    }
}

impl Default for Sniffer {
    fn default() -> Self {
        Self::new(&IngestConfig::default())
    }
}

/// Row length consistency: (1/K) * sum over distinct lengths L of N_L * (L - 1) / L
fn pattern_score(rows: &[Vec<String>]) -> f64 {
    let mut lengths: HashMap<usize, usize> = HashMap::new();
    for row in rows {
        *lengths.entry(row.len()).or_insert(0) += 1;
    }

    let k = lengths.len() as f64;
    lengths
        .iter()
        .filter(|(len, _)| **len > 0)
        .map(|(&len, &count)| count as f64 * (len as f64 - 1.0) / len as f64)
        .sum::<f64>()
        / k
}

/// Leading part of the content, cut at a line boundary when possible
fn sample_prefix(content: &str, max_bytes: usize) -> &str {
    if content.len() <= max_bytes {
        return content;
    }

    let mut end = max_bytes;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    let head = &content[..end];
    match head.rfind('\n') {
        Some(newline) if newline > 0 => &head[..newline],
        _ => head,
    }
}

fn ascii(c: char) -> Option<u8> {
    if c.is_ascii() {
        Some(c as u8)
    } else {
        None
    }
}

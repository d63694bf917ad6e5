//! Deterministic table naming for uploaded files
//!
//! Every uploaded file lands in its own slot. Slots are 0-based inside the
//! session, table names are 1-based: slot `0` is `retail_ingest_data_1`.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

/// Prefix shared by every ingested table
pub const TABLE_PREFIX: &str = "retail_ingest_data";

static TABLE_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)retail_ingest_data_(\d+)").expect("table name pattern is valid")
});

/// Table name for a 0-based upload slot
pub fn table_name_for_slot(slot: usize) -> String {
    format!("{}_{}", TABLE_PREFIX, slot + 1)
}

/// 0-based upload slot for a table name, if the name follows the pattern.
///
/// `retail_ingest_data_0` has no slot.
pub fn slot_for_table_name(name: &str) -> Option<usize> {
    let suffix = name
        .get(..TABLE_PREFIX.len() + 1)
        .filter(|head| head.eq_ignore_ascii_case(&format!("{}_", TABLE_PREFIX)))
        .map(|_| &name[TABLE_PREFIX.len() + 1..])?;

    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    suffix.parse::<usize>().ok()?.checked_sub(1)
}

/// Every distinct table name mentioned in a piece of query text.
///
/// Matching is case-insensitive, names come back lower-cased and in order
/// of first appearance.
pub fn extract_table_names(text: &str) -> IndexSet<String> {
    TABLE_NAME_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_names_are_one_based() {
        assert_eq!(table_name_for_slot(0), "retail_ingest_data_1");
        assert_eq!(table_name_for_slot(2), "retail_ingest_data_3");
    }

    #[test]
    fn test_slot_for_table_name() {
        assert_eq!(slot_for_table_name("retail_ingest_data_1"), Some(0));
        assert_eq!(slot_for_table_name("retail_ingest_data_3"), Some(2));
        assert_eq!(slot_for_table_name("RETAIL_INGEST_DATA_12"), Some(11));
        assert_eq!(slot_for_table_name("retail_ingest_data_0"), None);
        assert_eq!(slot_for_table_name("retail_ingest_data_"), None);
        assert_eq!(slot_for_table_name("retail_ingest_data_2a"), None);
        assert_eq!(slot_for_table_name("orders"), None);
    }

    #[test]
    fn test_repeated_names_are_collected_once() {
        let names = extract_table_names(
            "SELECT a.x FROM retail_ingest_data_2 a JOIN Retail_Ingest_Data_2 b ON a.id = b.id",
        );
        assert_eq!(names.len(), 1);
        assert_eq!(names.get_index(0).map(String::as_str), Some("retail_ingest_data_2"));
    }

    #[test]
    fn test_multiple_names_keep_first_seen_order() {
        let names = extract_table_names(
            "SELECT * FROM retail_ingest_data_10 JOIN retail_ingest_data_1 USING (order_id)",
        );
        let names: Vec<_> = names.into_iter().collect();
        assert_eq!(names, vec!["retail_ingest_data_10", "retail_ingest_data_1"]);
    }

    #[test]
    fn test_no_names() {
        assert!(extract_table_names("SELECT 1").is_empty());
    }
}

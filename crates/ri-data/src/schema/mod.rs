//! Schema descriptors read back from the backend

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use ri_core::{ColumnKind, ColumnSchema, SchemaDescriptor};

use crate::sources::sqlite_source::{quote_ident, IDENTITY_COLUMN};
use crate::DataError;

/// Map a declared SQLite column type to a column kind.
///
/// Follows SQLite's affinity rules: anything with numeric, integer or real
/// affinity counts as numeric.
pub fn classify_declared_type(declared: &str) -> ColumnKind {
    let upper = declared.to_uppercase();
    if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
        return ColumnKind::Text;
    }
    if upper.contains("INT")
        || upper.contains("REAL")
        || upper.contains("FLOA")
        || upper.contains("DOUB")
        || upper.contains("NUM")
        || upper.contains("DEC")
    {
        return ColumnKind::Numeric;
    }
    ColumnKind::Text
}

/// Render a stored value the way it appears in prompts
pub(crate) fn value_to_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

/// Describe a live table: columns, kinds, first rows and row count
pub(crate) fn describe_table(
    conn: &Connection,
    table_name: &str,
    sample_rows: usize,
) -> Result<SchemaDescriptor, DataError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table_name)))?;
    let columns = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(1)?, row.get::<_, Option<String>>(2)?))
        })?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|(name, _)| name != IDENTITY_COLUMN)
        .map(|(name, declared)| {
            ColumnSchema::new(name, classify_declared_type(declared.as_deref().unwrap_or("")))
        })
        .collect::<Vec<_>>();

    if columns.is_empty() {
        return Err(DataError::Backend(format!("table '{}' does not exist", table_name)));
    }

    let projection: Vec<String> = columns.iter().map(|c| quote_ident(&c.name)).collect();
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM {} ORDER BY {} LIMIT ?1",
        projection.join(", "),
        quote_ident(table_name),
        quote_ident(IDENTITY_COLUMN)
    ))?;
    let mut rows = stmt.query([sample_rows as i64])?;
    let mut samples = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            cells.push(value_to_text(row.get_ref(idx)?));
        }
        samples.push(cells);
    }

    let row_count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", quote_ident(table_name)),
        [],
        |row| row.get(0),
    )?;

    Ok(SchemaDescriptor {
        table_name: table_name.to_string(),
        columns,
        sample_rows: samples,
        row_count: row_count as usize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_declared_type() {
        assert_eq!(classify_declared_type("NUMERIC"), ColumnKind::Numeric);
        assert_eq!(classify_declared_type("decimal(10,2)"), ColumnKind::Numeric);
        assert_eq!(classify_declared_type("INTEGER"), ColumnKind::Numeric);
        assert_eq!(classify_declared_type("TEXT"), ColumnKind::Text);
        assert_eq!(classify_declared_type("VARCHAR(20)"), ColumnKind::Text);
        assert_eq!(classify_declared_type(""), ColumnKind::Text);
    }

    #[test]
    fn test_describe_unknown_table() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(matches!(
            describe_table(&conn, "retail_ingest_data_9", 3),
            Err(DataError::Backend(_))
        ));
    }

    #[test]
    fn test_describe_respects_sample_limit() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE t (\"_row_id\" INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT, qty NUMERIC);
             INSERT INTO t (name, qty) VALUES ('a', 1), ('b', 2.5), (NULL, 3);",
        )
        .unwrap();

        let descriptor = describe_table(&conn, "t", 2).unwrap();
        assert_eq!(
            descriptor.columns,
            vec![
                ColumnSchema::new("name", ColumnKind::Text),
                ColumnSchema::new("qty", ColumnKind::Numeric),
            ]
        );
        assert_eq!(descriptor.sample_rows, vec![vec!["a", "1"], vec!["b", "2.5"]]);
        assert_eq!(descriptor.row_count, 3);
    }
}

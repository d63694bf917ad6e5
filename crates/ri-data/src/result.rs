//! Query results

use std::sync::Arc;
use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use arrow::util::pretty::pretty_format_batches;
use rusqlite::types::Value;
use rusqlite::Statement;

use crate::DataError;

/// Rows produced by one executed query
#[derive(Debug, Clone)]
pub struct ResultSet {
    batch: RecordBatch,
}

impl ResultSet {
    /// Drain a prepared statement into a result set
    pub(crate) fn from_statement(stmt: &mut Statement<'_>) -> Result<Self, DataError> {
        let names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
        let width = names.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([])?;
        while let Some(row) = cursor.next()? {
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                values.push(Value::from(row.get_ref(idx)?));
            }
            rows.push(values);
        }

        Self::from_values(names, rows)
    }

    /// Build from column names and row values.
    ///
    /// A column of integers becomes `Int64`, a column with any real becomes
    /// `Float64`; text, blobs and all-null columns become `Utf8`.
    pub fn from_values(names: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, DataError> {
        if names.is_empty() {
            return Ok(Self {
                batch: RecordBatch::new_empty(Arc::new(Schema::empty())),
            });
        }

        let mut fields = Vec::with_capacity(names.len());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(names.len());

        for (idx, name) in names.iter().enumerate() {
            let column = rows.iter().map(|row| row.get(idx));
            let array: ArrayRef = match infer_type(column.clone().flatten()) {
                DataType::Int64 => Arc::new(Int64Array::from_iter(column.map(|v| match v {
                    Some(Value::Integer(i)) => Some(*i),
                    _ => None,
                }))),
                DataType::Float64 => Arc::new(Float64Array::from_iter(column.map(|v| match v {
                    Some(Value::Integer(i)) => Some(*i as f64),
                    Some(Value::Real(f)) => Some(*f),
                    _ => None,
                }))),
                _ => Arc::new(StringArray::from_iter(column.map(|v| match v {
                    None | Some(Value::Null) => None,
                    Some(Value::Integer(i)) => Some(i.to_string()),
                    Some(Value::Real(f)) => Some(f.to_string()),
                    Some(Value::Text(s)) => Some(s.clone()),
                    Some(Value::Blob(b)) => Some(format!("<{} bytes>", b.len())),
                }))),
            };
            fields.push(Field::new(name, array.data_type().clone(), true));
            arrays.push(array);
        }

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        Ok(Self { batch })
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Index of a column; exact match first, then case-insensitive
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let names = self.column_names();
        names
            .iter()
            .position(|n| n == name)
            .or_else(|| names.iter().position(|n| n.eq_ignore_ascii_case(name)))
    }

    pub fn column(&self, idx: usize) -> &ArrayRef {
        self.batch.column(idx)
    }

    pub fn is_numeric(&self, idx: usize) -> bool {
        matches!(
            self.batch.column(idx).data_type(),
            DataType::Int64 | DataType::Float64
        )
    }

    /// Whether every value of a column is null
    pub fn is_null_column(&self, idx: usize) -> bool {
        self.batch.column(idx).null_count() == self.num_rows()
    }

    /// Numeric cell value; `None` for nulls and text columns
    pub fn value_as_f64(&self, col: usize, row: usize) -> Option<f64> {
        let column = self.batch.column(col);
        if column.is_null(row) {
            return None;
        }
        if let Some(ints) = column.as_any().downcast_ref::<Int64Array>() {
            Some(ints.value(row) as f64)
        } else {
            column
                .as_any()
                .downcast_ref::<Float64Array>()
                .map(|floats| floats.value(row))
        }
    }

    /// Cell rendered as a label
    pub fn label(&self, col: usize, row: usize) -> String {
        array_value_to_string(self.batch.column(col), row).unwrap_or_default()
    }

    /// Readable table form, fed back to the language model
    pub fn to_text(&self) -> String {
        if self.num_columns() == 0 {
            return "Query returned no columns.".to_string();
        }
        if self.is_empty() {
            return format!("Query returned no rows (columns: {}).", self.column_names().join(", "));
        }
        match pretty_format_batches(&[self.batch.clone()]) {
            Ok(table) => table.to_string(),
            Err(e) => format!("Unable to format results: {}", e),
        }
    }
}

fn infer_type<'a>(values: impl Iterator<Item = &'a Value>) -> DataType {
    let mut saw_int = false;
    let mut saw_real = false;
    for value in values {
        match value {
            Value::Null => {}
            Value::Integer(_) => saw_int = true,
            Value::Real(_) => saw_real = true,
            Value::Text(_) | Value::Blob(_) => return DataType::Utf8,
        }
    }
    match (saw_int, saw_real) {
        (_, true) => DataType::Float64,
        (true, false) => DataType::Int64,
        (false, false) => DataType::Utf8,
    }
}

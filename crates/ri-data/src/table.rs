//! Typed tables produced by ingestion

use std::sync::Arc;
use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use ri_core::{ColumnKind, ColumnSchema};
use rusqlite::types::Value;

use crate::DataError;

/// One column worth of normalised values
#[derive(Debug, Clone)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

/// A named, normalised table derived from one uploaded file.
///
/// Numeric columns are stored as `Float64`, everything else as `Utf8`.
#[derive(Debug, Clone)]
pub struct TypedTable {
    /// Table name in the backend
    pub name: String,
    /// Column values
    pub batch: RecordBatch,
}

impl TypedTable {
    /// Build a table from column names and their values
    pub fn from_columns(
        name: impl Into<String>,
        columns: Vec<(String, ColumnData)>,
    ) -> Result<Self, DataError> {
        let mut fields = Vec::with_capacity(columns.len());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(columns.len());

        for (column_name, data) in columns {
            match data {
                ColumnData::Numeric(values) => {
                    fields.push(Field::new(&column_name, DataType::Float64, true));
                    arrays.push(Arc::new(Float64Array::from(values)));
                }
                ColumnData::Text(values) => {
                    fields.push(Field::new(&column_name, DataType::Utf8, true));
                    arrays.push(Arc::new(StringArray::from(values)));
                }
            }
        }

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        Ok(Self {
            name: name.into(),
            batch,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Column names and kinds, in file order
    pub fn columns(&self) -> Vec<ColumnSchema> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|field| {
                let kind = match field.data_type() {
                    DataType::Float64 => ColumnKind::Numeric,
                    _ => ColumnKind::Text,
                };
                ColumnSchema::new(field.name().clone(), kind)
            })
            .collect()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Values of one row, ready to bind into an insert statement
    pub(crate) fn row_values(&self, row: usize) -> Vec<Value> {
        self.batch
            .columns()
            .iter()
            .map(|column| {
                if column.is_null(row) {
                    return Value::Null;
                }
                if let Some(numbers) = column.as_any().downcast_ref::<Float64Array>() {
                    Value::Real(numbers.value(row))
                } else if let Some(strings) = column.as_any().downcast_ref::<StringArray>() {
                    Value::Text(strings.value(row).to_string())
                } else {
                    Value::Null
                }
            })
            .collect()
    }
}

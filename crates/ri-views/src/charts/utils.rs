//! Extraction of plottable series from query results

use indexmap::IndexMap;
use ri_core::ChartSpec;
use ri_data::ResultSet;

use crate::RenderError;

/// Labels and their values, in plotting order
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl Series {
    /// One point per row, in result order. Rows without a finite value are skipped.
    pub fn ordered(results: &ResultSet, spec: &ChartSpec) -> Result<Self, RenderError> {
        let (x, y) = axes(results, spec)?;
        let mut series = Series {
            labels: Vec::new(),
            values: Vec::new(),
        };
        for row in 0..results.num_rows() {
            if let Some(value) = finite_value(results, y, row) {
                series.labels.push(results.label(x, row));
                series.values.push(value);
            }
        }
        series.plottable()
    }

    /// Values summed per label, labels in order of first appearance
    pub fn grouped(results: &ResultSet, spec: &ChartSpec) -> Result<Self, RenderError> {
        let (x, y) = axes(results, spec)?;
        let mut sums: IndexMap<String, f64> = IndexMap::new();
        for row in 0..results.num_rows() {
            if let Some(value) = finite_value(results, y, row) {
                *sums.entry(results.label(x, row)).or_insert(0.0) += value;
            }
        }
        // Sums of huge values can still overflow
        let (labels, values) = sums.into_iter().filter(|(_, v)| v.is_finite()).unzip();
        Series { labels, values }.plottable()
    }

    /// Keep only strictly positive values
    pub fn positive(self) -> Result<Self, RenderError> {
        let (labels, values) = self
            .labels
            .into_iter()
            .zip(self.values)
            .filter(|(_, v)| *v > 0.0)
            .unzip();
        Series { labels, values }.plottable()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value range padded for display, always containing zero
    pub fn value_range(&self) -> (f64, f64) {
        let min = self.values.iter().copied().fold(0.0, f64::min);
        let max = self.values.iter().copied().fold(0.0, f64::max);
        let pad = ((max - min) * 0.1).max(1e-9);
        if max - min < 1e-12 {
            (min - 1.0, max + 1.0)
        } else {
            (if min < 0.0 { min - pad } else { min }, max + pad)
        }
    }

    /// Non-empty, with an axis range that stays finite
    fn plottable(self) -> Result<Self, RenderError> {
        let (low, high) = self.value_range();
        if self.is_empty() || !(high - low).is_finite() {
            Err(RenderError::NoData)
        } else {
            Ok(self)
        }
    }
}

/// Cell value usable on an axis; NaN and infinities count as missing
fn finite_value(results: &ResultSet, col: usize, row: usize) -> Option<f64> {
    results.value_as_f64(col, row).filter(|v| v.is_finite())
}

/// Column indices of the x and y axes
fn axes(results: &ResultSet, spec: &ChartSpec) -> Result<(usize, usize), RenderError> {
    let x = results
        .column_index(&spec.x_axis)
        .ok_or_else(|| RenderError::MissingColumn(spec.x_axis.clone()))?;
    let y = results
        .column_index(&spec.y_axis)
        .ok_or_else(|| RenderError::MissingColumn(spec.y_axis.clone()))?;
    if results.is_empty() || results.is_null_column(y) {
        return Err(RenderError::NoData);
    }
    if !results.is_numeric(y) {
        return Err(RenderError::NonNumeric(spec.y_axis.clone()));
    }
    Ok((x, y))
}

//! Chart rendering for query results

pub mod charts;

use thiserror::Error;

pub use charts::{ChartConfig, ChartRenderer};

/// Errors raised while turning a result set into a chart
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Column '{0}' is not in the query result")]
    MissingColumn(String),

    #[error("Column '{0}' is not numeric")]
    NonNumeric(String),

    #[error("No data to plot")]
    NoData,

    #[error("Drawing failed: {0}")]
    Drawing(String),
}

/// Convert a plotters error
pub(crate) fn drawing<E: std::fmt::Display>(error: E) -> RenderError {
    RenderError::Drawing(error.to_string())
}

//! Chart specifications and rendered charts

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Kind of chart the model asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    None,
    Bar,
    Line,
    Pie,
}

impl ChartKind {
    /// Parse a chart type name. Anything unrecognized means "no chart".
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "bar" => ChartKind::Bar,
            "line" => ChartKind::Line,
            "pie" => ChartKind::Pie,
            _ => ChartKind::None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::None => "none",
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ChartKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.as_deref().map(ChartKind::parse).unwrap_or_default())
    }
}

/// Declarative description of the chart to draw from a result set
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub kind: ChartKind,

    /// Column used for categories / the ordered axis / slice labels
    pub x_axis: String,

    /// Column holding the numeric values
    pub y_axis: String,

    pub title: String,

    pub description: String,
}

impl ChartSpec {
    /// Whether a chart is requested at all
    pub fn wants_chart(&self) -> bool {
        self.kind != ChartKind::None
    }
}

/// A chart rendered to an SVG document
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    pub kind: ChartKind,
    pub title: String,
    pub description: String,
    pub svg: String,
}

//! Bar, line and pie charts rendered to SVG

pub mod bar;
pub mod colors;
pub mod line;
pub mod pie;
pub mod utils;

use ri_core::{ChartKind, ChartSpec, RenderedChart};
use ri_data::ResultSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::RenderError;
use utils::Series;

/// Size of rendered charts, in pixels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
        }
    }
}

/// Turns a result set and a chart specification into a chart
#[derive(Debug, Clone, Default)]
pub struct ChartRenderer {
    config: ChartConfig,
}

impl ChartRenderer {
    pub fn new(config: ChartConfig) -> Self {
        Self { config }
    }

    /// Render the requested chart. `Ok(None)` when no chart is requested.
    pub fn render(
        &self,
        results: &ResultSet,
        spec: &ChartSpec,
    ) -> Result<Option<RenderedChart>, RenderError> {
        if !spec.wants_chart() {
            debug!("No chart requested");
            return Ok(None);
        }

        let title = if spec.title.trim().is_empty() {
            format!("{} by {}", spec.y_axis, spec.x_axis)
        } else {
            spec.title.clone()
        };

        let svg = match spec.kind {
            ChartKind::Bar => {
                let series = Series::grouped(results, spec)?;
                bar::draw(&series, spec, &title, &self.config)?
            }
            ChartKind::Line => {
                let series = Series::ordered(results, spec)?;
                line::draw(&series, spec, &title, &self.config)?
            }
            ChartKind::Pie => {
                let series = Series::grouped(results, spec)?.positive()?;
                pie::draw(&series, &title, &self.config)?
            }
            ChartKind::None => return Ok(None),
        };

        info!("Rendered {} chart '{}' ({} bytes)", spec.kind, title, svg.len());
        Ok(Some(RenderedChart {
            kind: spec.kind,
            title,
            description: spec.description.clone(),
            svg,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ri_data::Backend;

    fn results(sql: &str) -> ResultSet {
        Backend::in_memory().unwrap().query(sql).unwrap()
    }

    fn sales() -> ResultSet {
        results(
            "SELECT 'Tea' AS product, 3 AS units UNION ALL \
             SELECT 'Milk', 5 UNION ALL \
             SELECT 'Tea', 4",
        )
    }

    fn spec(kind: ChartKind, x: &str, y: &str) -> ChartSpec {
        ChartSpec {
            kind,
            x_axis: x.to_string(),
            y_axis: y.to_string(),
            title: "Units by product".to_string(),
            description: "Units sold".to_string(),
        }
    }

    #[test]
    fn test_none_renders_nothing() {
        let renderer = ChartRenderer::default();
        let mut none = spec(ChartKind::None, "missing", "also_missing");
        assert!(renderer.render(&sales(), &none).unwrap().is_none());

        none.x_axis = "product".to_string();
        none.y_axis = "units".to_string();
        assert!(renderer.render(&sales(), &none).unwrap().is_none());
    }

    #[test]
    fn test_each_kind_renders_svg() {
        let renderer = ChartRenderer::default();
        for kind in [ChartKind::Bar, ChartKind::Line, ChartKind::Pie] {
            let chart = renderer
                .render(&sales(), &spec(kind, "product", "units"))
                .unwrap()
                .unwrap();
            assert_eq!(chart.kind, kind);
            assert_eq!(chart.title, "Units by product");
            assert_eq!(chart.description, "Units sold");
            assert!(chart.svg.contains("<svg"));
            assert!(chart.svg.contains("Units by product"));
        }
    }

    #[test]
    fn test_missing_column() {
        let renderer = ChartRenderer::default();
        let err = renderer
            .render(&sales(), &spec(ChartKind::Bar, "product", "revenue"))
            .unwrap_err();
        assert!(matches!(err, RenderError::MissingColumn(name) if name == "revenue"));
    }

    #[test]
    fn test_text_values_are_not_numeric() {
        let renderer = ChartRenderer::default();
        let err = renderer
            .render(&sales(), &spec(ChartKind::Line, "units", "product"))
            .unwrap_err();
        assert!(matches!(err, RenderError::NonNumeric(_)));
    }

    #[test]
    fn test_pie_without_positive_values() {
        let renderer = ChartRenderer::default();
        let err = renderer
            .render(
                &results("SELECT 'a' AS k, 0 AS v UNION ALL SELECT 'b', -2"),
                &spec(ChartKind::Pie, "k", "v"),
            )
            .unwrap_err();
        assert!(matches!(err, RenderError::NoData));
    }

    #[test]
    fn test_infinite_values_are_left_out() {
        let renderer = ChartRenderer::default();
        let results = results("SELECT 'a' AS k, 1e999 AS v UNION ALL SELECT 'b', 2");
        for kind in [ChartKind::Bar, ChartKind::Line, ChartKind::Pie] {
            let chart = renderer.render(&results, &spec(kind, "k", "v")).unwrap().unwrap();
            assert!(!chart.svg.contains("NaN"));
            if kind == ChartKind::Pie {
                assert!(chart.svg.contains("b (100.0%)"));
            }
        }
    }

    #[test]
    fn test_default_title() {
        let renderer = ChartRenderer::default();
        let mut untitled = spec(ChartKind::Bar, "product", "units");
        untitled.title.clear();
        let chart = renderer.render(&sales(), &untitled).unwrap().unwrap();
        assert_eq!(chart.title, "units by product");
    }
}

//! Line chart: ordered x against numeric y

use plotters::prelude::*;
use ri_core::ChartSpec;

use super::colors::primary_color;
use super::utils::Series;
use super::ChartConfig;
use crate::{drawing, RenderError};

const MAX_X_LABELS: usize = 12;

/// Draw the series as a line with point markers, in result order
pub fn draw(
    series: &Series,
    spec: &ChartSpec,
    title: &str,
    config: &ChartConfig,
) -> Result<String, RenderError> {
    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (config.width, config.height)).into_drawing_area();
        root.fill(&WHITE).map_err(drawing)?;

        let last = series.len().saturating_sub(1).max(1) as f64;
        let (low, high) = series.value_range();
        let color = primary_color();

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5f64..last + 0.5, low..high)
            .map_err(drawing)?;

        let label_of = |x: &f64| {
            let idx = x.round();
            if (x - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            series.labels.get(idx as usize).cloned().unwrap_or_default()
        };

        chart
            .configure_mesh()
            .x_labels(series.len().min(MAX_X_LABELS))
            .x_label_formatter(&label_of)
            .x_desc(spec.x_axis.as_str())
            .y_desc(spec.y_axis.as_str())
            .draw()
            .map_err(drawing)?;

        let points: Vec<(f64, f64)> = series
            .values
            .iter()
            .enumerate()
            .map(|(idx, value)| (idx as f64, *value))
            .collect();

        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
            .map_err(drawing)?;
        chart
            .draw_series(points.iter().map(|&point| Circle::new(point, 3, color.filled())))
            .map_err(drawing)?;

        root.present().map_err(drawing)?;
    }
    Ok(svg)
}

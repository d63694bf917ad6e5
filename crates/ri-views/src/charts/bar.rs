//! Bar chart: categorical x against numeric y

use plotters::prelude::*;
use ri_core::ChartSpec;

use super::colors::primary_color;
use super::utils::Series;
use super::ChartConfig;
use crate::{drawing, RenderError};

/// Draw one bar per label
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

        let n = series.len() as u32;
        let (low, high) = series.value_range();

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d((0u32..n).into_segmented(), low..high)
            .map_err(drawing)?;

        let label_of = |value: &SegmentValue<u32>| match value {
            SegmentValue::CenterOf(idx) => {
                series.labels.get(*idx as usize).cloned().unwrap_or_default()
            }
            _ => String::new(),
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(series.len())
            .x_label_formatter(&label_of)
            .x_desc(spec.x_axis.as_str())
            .y_desc(spec.y_axis.as_str())
            .draw()
            .map_err(drawing)?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(primary_color().filled())
                    .margin(10)
                    .data(
                        series
                            .values
                            .iter()
                            .enumerate()
                            .map(|(idx, value)| (idx as u32, *value)),
                    ),
            )
            .map_err(drawing)?;

        root.present().map_err(drawing)?;
    }
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_svg() {
        let series = Series {
            labels: vec!["North".to_string(), "South".to_string()],
            values: vec![120.0, 80.0],
        };
        let svg = draw(
            &series,
            &ChartSpec::default(),
            "Sales by region",
            &ChartConfig::default(),
        )
        .unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("North"));
        assert!(svg.contains("South"));
        assert!(svg.contains("<rect"));
    }
}

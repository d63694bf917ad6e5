//! Pie chart: label shares of a positive total

use std::f64::consts::PI;
use plotters::prelude::*;

use super::colors::categorical_color;
use super::utils::Series;
use super::ChartConfig;
use crate::{drawing, RenderError};

/// Arc segments per full turn
const ARC_STEPS: f64 = 120.0;

/// Draw one wedge per label. Values must be positive.
pub fn draw(series: &Series, title: &str, config: &ChartConfig) -> Result<String, RenderError> {
    let total: f64 = series.values.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        return Err(RenderError::NoData);
    }

    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (config.width, config.height)).into_drawing_area();
        root.fill(&WHITE).map_err(drawing)?;
        let area = root.titled(title, ("sans-serif", 22)).map_err(drawing)?;

        let (width, height) = area.dim_in_pixel();
        let center = (width as f64 / 2.0, height as f64 / 2.0);
        let radius = width.min(height) as f64 * 0.35;
        let label_style = TextStyle::from(("sans-serif", 14).into_font());

        let mut start = -PI / 2.0;
        for (idx, (label, value)) in series.labels.iter().zip(&series.values).enumerate() {
            let sweep = value / total * 2.0 * PI;
            let end = start + sweep;

            let outline = wedge(center, radius, start, end);
            area.draw(&Polygon::new(outline, categorical_color(idx).filled()))
                .map_err(drawing)?;

            let middle = start + sweep / 2.0;
            let anchor = point_at(center, radius * 1.12, middle);
            let text = format!("{} ({:.1}%)", label, value / total * 100.0);
            let (text_width, _) = area.estimate_text_size(&text, &label_style).map_err(drawing)?;
            let x = if middle.cos() < 0.0 { anchor.0 - text_width as i32 } else { anchor.0 };
            area.draw(&Text::new(text, (x, anchor.1), label_style.clone()))
                .map_err(drawing)?;

            start = end;
        }

        root.present().map_err(drawing)?;
    }
    Ok(svg)
}

/// Polygon outline of a wedge between two angles
fn wedge(center: (f64, f64), radius: f64, start: f64, end: f64) -> Vec<(i32, i32)> {
    let steps = (((end - start) / (2.0 * PI)) * ARC_STEPS).ceil().max(1.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push((center.0.round() as i32, center.1.round() as i32));
    for step in 0..=steps {
        let angle = start + (end - start) * step as f64 / steps as f64;
        points.push(point_at(center, radius, angle));
    }
    points
}

fn point_at(center: (f64, f64), radius: f64, angle: f64) -> (i32, i32) {
    (
        (center.0 + radius * angle.cos()).round() as i32,
        (center.1 + radius * angle.sin()).round() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pie_svg() {
        let series = Series {
            labels: vec!["Tea".to_string(), "Milk".to_string()],
            values: vec![7.0, 3.0],
        };
        let svg = draw(&series, "Share", &ChartConfig::default()).unwrap();
        assert!(svg.contains("Share"));
        assert!(svg.contains("Tea (70.0%)"));
        assert!(svg.contains("Milk (30.0%)"));
        assert!(svg.contains("<polygon"));
    }

    #[test]
    fn test_wedge_shape() {
        let points = wedge((100.0, 100.0), 50.0, 0.0, PI / 2.0);
        assert_eq!(points[0], (100, 100));
        assert_eq!(points[1], (150, 100));
        assert_eq!(*points.last().unwrap(), (100, 150));
    }

    #[test]
    fn test_zero_total() {
        let series = Series {
            labels: vec!["a".to_string()],
            values: vec![0.0],
        };
        assert!(matches!(draw(&series, "x", &ChartConfig::default()), Err(RenderError::NoData)));
    }

    #[test]
    fn test_infinite_total() {
        let series = Series {
            labels: vec!["a".to_string(), "b".to_string()],
            values: vec![f64::INFINITY, 2.0],
        };
        assert!(matches!(draw(&series, "x", &ChartConfig::default()), Err(RenderError::NoData)));
    }
}

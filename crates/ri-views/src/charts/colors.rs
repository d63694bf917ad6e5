//! Chart colors

use plotters::style::RGBColor;

const PALETTE: &[RGBColor] = &[
    RGBColor(100, 150, 250), // Blue
    RGBColor(250, 150, 100), // Orange
    RGBColor(150, 250, 100), // Green
    RGBColor(250, 100, 150), // Pink
    RGBColor(150, 100, 250), // Purple
    RGBColor(250, 250, 100), // Yellow
    RGBColor(100, 250, 250), // Cyan
    RGBColor(250, 100, 100), // Red
];

/// Categorical color for the `index`-th series or slice
pub fn categorical_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

/// Primary color of single-series charts
pub fn primary_color() -> RGBColor {
    categorical_color(0)
}

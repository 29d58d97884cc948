use crate::canvas::Canvas;
use crate::config::PlotConfig;
use crate::layout::axes::Axis;
use crate::mathtext;
use crate::primitives::TextStyle;

/// Rectangular plot area within the canvas.
#[derive(Debug, Clone, Copy)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Margins sized from tick labels, axis labels and the title line.
    pub fn auto(canvas: &Canvas, x_axis: &Axis, y_axis: &Axis, config: &PlotConfig) -> Self {
        let tick_style = TextStyle::sized(config.font.tick_size);
        let outward = if config.axes.tick_direction == "in" { 0.0 } else { config.axes.tick_length };

        let max_tick_w = y_axis
            .tick_labels
            .iter()
            .map(|l| canvas.measure_text(l, &tick_style).width)
            .fold(0.0_f64, f64::max);
        let mut left = 12.0 + outward + max_tick_w + 6.0;
        if !y_axis.label.is_empty() {
            left += config.font.label_size + 8.0;
        }

        let mut bottom = 12.0 + outward + config.font.tick_size + 6.0;
        if !x_axis.label.is_empty() {
            // Subscripts hang below the baseline.
            let has_scripts =
                mathtext::parse(&x_axis.label).iter().any(|r| r.shift != mathtext::Shift::Normal);
            bottom += config.font.label_size * if has_scripts { 1.5 } else { 1.2 } + 4.0;
        }

        let top = config.font.title_size * 1.4 + 14.0;
        let right = 18.0;

        let width = canvas.width - left - right;
        let height = canvas.height - top - bottom;

        Self { left, top, width: width.max(50.0), height: height.max(50.0) }
    }
}

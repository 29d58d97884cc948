//! Histogram figures and the step geometry they share.

pub mod single;
pub mod stacked;

mod axes_draw;

use crate::RenderError;
use crate::canvas::Canvas;
use crate::config::PlotConfig;
use crate::layout::axes::Axis;
use crate::layout::margins::PlotArea;

/// A borrowed 1D histogram: `edges.len() == values.len() + 1`.
#[derive(Debug, Clone, Copy)]
pub struct Step<'a> {
    pub edges: &'a [f64],
    pub values: &'a [f64],
}

impl<'a> Step<'a> {
    pub fn new(edges: &'a [f64], values: &'a [f64]) -> Self {
        Self { edges, values }
    }

    /// Check shape and edge ordering; `label` names the series in the error.
    pub fn validate(&self, label: &str) -> crate::Result<()> {
        let invalid = |reason: String| RenderError::InvalidSeries { label: label.to_string(), reason };
        if self.values.is_empty() {
            return Err(invalid("no bins".into()));
        }
        if self.edges.len() != self.values.len() + 1 {
            return Err(invalid(format!(
                "{} edges for {} bins",
                self.edges.len(),
                self.values.len()
            )));
        }
        if self.edges.iter().any(|e| !e.is_finite()) {
            return Err(invalid("non-finite bin edge".into()));
        }
        if self.edges.windows(2).any(|w| w[1] <= w[0]) {
            return Err(invalid("bin edges not strictly increasing".into()));
        }
        Ok(())
    }

    fn x_range(&self) -> (f64, f64) {
        (self.edges[0], self.edges[self.edges.len() - 1])
    }
}

/// Outline of a step histogram in data coordinates, closed down to zero at both ends.
pub fn step_outline(edges: &[f64], values: &[f64]) -> Vec<(f64, f64)> {
    let mut pts = Vec::with_capacity(2 * values.len() + 2);
    pts.push((edges[0], 0.0));
    for (i, &v) in values.iter().enumerate() {
        pts.push((edges[i], v));
        pts.push((edges[i + 1], v));
    }
    pts.push((edges[values.len()], 0.0));
    pts
}

/// Closed region between two step curves on the same edges.
pub fn step_band(edges: &[f64], lower: &[f64], upper: &[f64]) -> Vec<(f64, f64)> {
    let n = upper.len();
    let mut pts = Vec::with_capacity(4 * n);
    for i in 0..n {
        pts.push((edges[i], upper[i]));
        pts.push((edges[i + 1], upper[i]));
    }
    for i in (0..n).rev() {
        pts.push((edges[i + 1], lower[i]));
        pts.push((edges[i], lower[i]));
    }
    pts
}

/// Canvas, plot area and axes for one histogram figure.
pub(crate) struct Frame {
    pub canvas: Canvas,
    pub area: PlotArea,
    pub x_axis: Axis,
    pub y_axis: Axis,
}

impl Frame {
    pub fn new(
        x_range: (f64, f64),
        y_range: (f64, f64),
        x_label: &str,
        y_label: &str,
        config: &PlotConfig,
    ) -> crate::Result<Self> {
        let canvas = Canvas::new(config.figure.width, config.figure.height)?;
        let target = config.axes.target_ticks;
        let x_axis = Axis::bounded(x_range.0, x_range.1, target).with_label(x_label);

        let headroom = 1.0 + config.axes.y_headroom.max(0.0);
        let (lo, hi) = (y_range.0.min(0.0) * headroom, y_range.1.max(0.0) * headroom);
        let hi = if hi <= lo { lo + 1.0 } else { hi };
        let y_axis = Axis::auto_linear(lo, hi, target).with_label(y_label);

        let area = PlotArea::auto(&canvas, &x_axis, &y_axis, config);
        Ok(Self { canvas, area, x_axis, y_axis })
    }

    pub fn to_pixels(&self, pts: &[(f64, f64)]) -> Vec<(f64, f64)> {
        let a = &self.area;
        pts.iter()
            .map(|&(x, y)| {
                (
                    self.x_axis.data_to_pixel(x, a.left, a.right()),
                    self.y_axis.data_to_pixel(y, a.bottom(), a.top),
                )
            })
            .collect()
    }

    pub fn draw_grid(&mut self, config: &PlotConfig) {
        axes_draw::draw_grid(&mut self.canvas, &self.area, &self.x_axis, &self.y_axis, config);
    }

    pub fn draw_axes(&mut self, config: &PlotConfig) {
        axes_draw::draw_axes(&mut self.canvas, &self.area, &self.x_axis, &self.y_axis, config);
    }

    pub fn clip_to_area(&mut self) {
        let a = self.area;
        self.canvas.push_clip(a.left, a.top, a.width, a.height);
    }
}

/// Smallest and largest value across several value slices (`(0, 0)` when empty).
pub(crate) fn value_range<'v>(values: impl IntoIterator<Item = &'v [f64]>) -> (f64, f64) {
    values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((0.0_f64, 0.0_f64), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

//! Signal-over-background figure: filled background steps plus signal outlines.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::Color;
use crate::config::PlotConfig;
use crate::layout::legend::{self, LegendEntry, LegendKind};
use crate::plots::{Frame, Step, step_band, step_outline, value_range};
use crate::primitives::{LineStyle, Style};
use crate::{RenderError, title};

pub const BACKGROUND_LABEL: &str = "Fully hadronic";
pub const SIGNAL_LABEL: &str = "Signal";
pub const Y_LABEL: &str = "Events";

/// How several background series share the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackMode {
    /// Each background starts at zero and is layered over the previous ones.
    #[default]
    Overlay,
    /// Each background starts where the sum of the previous ones ends.
    Cumulative,
}

impl fmt::Display for StackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StackMode::Overlay => "overlay",
            StackMode::Cumulative => "cumulative",
        })
    }
}

impl FromStr for StackMode {
    type Err = RenderError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "overlay" => Ok(StackMode::Overlay),
            "cumulative" => Ok(StackMode::Cumulative),
            other => Err(RenderError::Config(format!("unknown stack mode: {other}"))),
        }
    }
}

/// One histogram name under one variation.
#[derive(Debug, Clone)]
pub struct StackedPlot<'a> {
    pub name: &'a str,
    pub variation: &'a str,
    pub x_label: &'a str,
    pub signal: Vec<Step<'a>>,
    pub background: Vec<Step<'a>>,
    pub stack_mode: StackMode,
}

impl StackedPlot<'_> {
    pub fn title(&self) -> String {
        format!("Histogram: {} ({})", self.name, self.variation)
    }

    /// File name without directory, `{name}_{variation}.{ext}`.
    pub fn file_name(&self, ext: &str) -> String {
        format!("{}_{}.{ext}", self.name.replace('/', "_"), self.variation)
    }
}

/// Lower and upper curve of one filled background layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// Compute the fill region of every background series.
///
/// The running total is accumulated in both modes; it becomes the baseline of
/// the next layer only under [`StackMode::Cumulative`], which therefore needs
/// every background on the same bin edges.
pub fn background_layers(background: &[Step<'_>], mode: StackMode) -> crate::Result<Vec<Layer>> {
    let Some(first) = background.first() else {
        return Err(RenderError::EmptySeries("background"));
    };
    if mode == StackMode::Cumulative
        && let Some(bad) = background.iter().position(|s| s.edges != first.edges)
    {
        return Err(RenderError::InvalidSeries {
            label: format!("{BACKGROUND_LABEL} #{}", bad + 1),
            reason: "cumulative stacking needs identical bin edges".into(),
        });
    }

    let mut running = vec![0.0_f64; first.values.len()];
    let mut layers = Vec::with_capacity(background.len());
    for s in background {
        let lower = match mode {
            StackMode::Overlay => vec![0.0; s.values.len()],
            StackMode::Cumulative => running.clone(),
        };
        let upper = lower.iter().zip(s.values).map(|(b, v)| b + v).collect();
        if s.values.len() == running.len() {
            for (r, v) in running.iter_mut().zip(s.values) {
                *r += v;
            }
        }
        layers.push(Layer { lower, upper });
    }
    Ok(layers)
}

/// Running total of all backgrounds, when they share a binning.
fn running_total(background: &[Step<'_>]) -> Option<Vec<f64>> {
    let first = background.first()?;
    if background.iter().any(|s| s.edges != first.edges) {
        return None;
    }
    let mut total = vec![0.0; first.values.len()];
    for s in background {
        for (t, v) in total.iter_mut().zip(s.values) {
            *t += v;
        }
    }
    Some(total)
}

fn background_color(i: usize, palette: &[Color], config: &PlotConfig) -> Color {
    if i == 0 || palette.is_empty() {
        config.colors.background
    } else {
        palette[i % palette.len()]
    }
}

fn signal_color(i: usize, palette: &[Color], config: &PlotConfig) -> Color {
    if i == 0 || palette.is_empty() {
        config.colors.signal
    } else {
        palette[(i + 1) % palette.len()]
    }
}

/// Render the figure to an SVG document.
pub fn render(plot: &StackedPlot<'_>, config: &PlotConfig) -> crate::Result<String> {
    if plot.signal.is_empty() {
        return Err(RenderError::EmptySeries("signal"));
    }
    if plot.background.is_empty() {
        return Err(RenderError::EmptySeries("background"));
    }
    for (i, s) in plot.background.iter().enumerate() {
        s.validate(&format!("{} {BACKGROUND_LABEL} #{}", plot.name, i + 1))?;
    }
    for (i, s) in plot.signal.iter().enumerate() {
        s.validate(&format!("{} {SIGNAL_LABEL} #{}", plot.name, i + 1))?;
    }

    let layers = background_layers(&plot.background, plot.stack_mode)?;
    let total = running_total(&plot.background);

    let x_range = plot
        .signal
        .iter()
        .chain(&plot.background)
        .map(Step::x_range)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (a, b)| (lo.min(a), hi.max(b)));
    let mut extents: Vec<&[f64]> = Vec::new();
    for l in &layers {
        extents.push(&l.lower);
        extents.push(&l.upper);
    }
    extents.extend(plot.signal.iter().map(|s| s.values));
    extents.extend(total.as_deref());
    let y_range = value_range(extents);
    debug!(name = plot.name, variation = plot.variation, ?x_range, ?y_range, "stacked plot range");

    let mut frame = Frame::new(x_range, y_range, plot.x_label, Y_LABEL, config)?;
    let palette = config.palette_colors();
    frame.draw_grid(config);

    frame.clip_to_area();
    for (i, (s, layer)) in plot.background.iter().zip(&layers).enumerate() {
        let pts = frame.to_pixels(&step_band(s.edges, &layer.lower, &layer.upper));
        let style = Style::translucent(background_color(i, &palette, config), config.colors.background_alpha);
        frame.canvas.polygon(&pts, &style);
    }
    for (i, s) in plot.signal.iter().enumerate() {
        let pts = frame.to_pixels(&step_outline(s.edges, s.values));
        let style = LineStyle::solid(signal_color(i, &palette, config), config.colors.signal_line_width);
        frame.canvas.polyline(&pts, &style);
    }
    frame.canvas.pop_clip();

    frame.draw_axes(config);
    title::draw_title(&mut frame.canvas, &frame.area, &plot.title(), config);

    let entries: Vec<LegendEntry> = (0..plot.background.len())
        .map(|i| LegendEntry {
            label: BACKGROUND_LABEL.into(),
            color: background_color(i, &palette, config),
            kind: LegendKind::FilledRect { alpha: config.colors.background_alpha },
        })
        .chain((0..plot.signal.len()).map(|i| LegendEntry {
            label: SIGNAL_LABEL.into(),
            color: signal_color(i, &palette, config),
            kind: LegendKind::Line { width: config.colors.signal_line_width },
        }))
        .collect();
    legend::draw_legend(&mut frame.canvas, &frame.area, &entries, config.font.legend_size);

    frame.canvas.finish_svg()
}

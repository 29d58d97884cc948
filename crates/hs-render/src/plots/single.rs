//! One histogram from one file, drawn as a step outline.

use crate::config::PlotConfig;
use crate::layout::legend::{self, LegendEntry, LegendKind};
use crate::plots::stacked::Y_LABEL;
use crate::plots::{Frame, Step, step_outline, value_range};
use crate::primitives::LineStyle;
use crate::title;

#[derive(Debug, Clone, Copy)]
pub struct SinglePlot<'a> {
    pub name: &'a str,
    /// Source file as shown in the title.
    pub source: &'a str,
    pub x_label: &'a str,
    pub series: Step<'a>,
}

impl SinglePlot<'_> {
    pub fn title(&self) -> String {
        format!("Histogram: {} from {}", self.name, self.source)
    }

    /// `{stem}_{name}.{ext}`, with directory separators in `name` flattened.
    pub fn file_name(&self, stem: &str, ext: &str) -> String {
        format!("{stem}_{}.{ext}", self.name.replace('/', "_"))
    }
}

pub fn render(plot: &SinglePlot<'_>, config: &PlotConfig) -> crate::Result<String> {
    plot.series.validate(plot.name)?;

    let x_range = plot.series.x_range();
    let y_range = value_range([plot.series.values]);
    let mut frame = Frame::new(x_range, y_range, plot.x_label, Y_LABEL, config)?;
    frame.draw_grid(config);

    let line = LineStyle::solid(config.colors.single, 1.5);
    frame.clip_to_area();
    let pts = frame.to_pixels(&step_outline(plot.series.edges, plot.series.values));
    frame.canvas.polyline(&pts, &line);
    frame.canvas.pop_clip();

    frame.draw_axes(config);
    title::draw_title(&mut frame.canvas, &frame.area, &plot.title(), config);
    let entry = LegendEntry {
        label: plot.name.to_string(),
        color: config.colors.single,
        kind: LegendKind::Line { width: line.width },
    };
    legend::draw_legend(&mut frame.canvas, &frame.area, &[entry], config.font.legend_size);

    frame.canvas.finish_svg()
}

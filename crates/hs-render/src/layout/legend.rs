use crate::canvas::Canvas;
use crate::color::Color;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

#[derive(Debug, Clone)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color,
    pub kind: LegendKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LegendKind {
    /// Swatch for a filled histogram, drawn at the given opacity.
    FilledRect { alpha: f64 },
    /// Short line sample for an outline histogram.
    Line { width: f64 },
}

/// Draw a framed legend in the top-right corner of the plot area.
pub fn draw_legend(canvas: &mut Canvas, area: &PlotArea, entries: &[LegendEntry], font_size: f64) {
    if entries.is_empty() {
        return;
    }

    let row_height = font_size + 5.0;
    let swatch_w = 20.0;
    let swatch_h = font_size * 0.7;
    let gap = 6.0;
    let padding = 6.0;

    let text_style = TextStyle::sized(font_size).baseline(TextBaseline::Central);

    let max_w = entries
        .iter()
        .map(|e| canvas.measure_text(&e.label, &text_style).width)
        .fold(0.0_f64, f64::max);

    let legend_w = padding + swatch_w + gap + max_w + padding;
    let legend_h = padding + entries.len() as f64 * row_height + padding;

    let lx = area.right() - legend_w - 6.0;
    let ly = area.top + 6.0;

    let bg_style = Style {
        fill: Some(Color::rgba(255, 255, 255, 0.8)),
        stroke: Some(Color::rgb(204, 204, 204)),
        stroke_width: 0.8,
        opacity: 1.0,
    };
    canvas.rect(lx, ly, legend_w, legend_h, &bg_style);

    for (i, entry) in entries.iter().enumerate() {
        let ey = ly + padding + i as f64 * row_height + row_height / 2.0;
        let sx = lx + padding;

        match entry.kind {
            LegendKind::FilledRect { alpha } => {
                canvas.rect(
                    sx,
                    ey - swatch_h / 2.0,
                    swatch_w,
                    swatch_h,
                    &Style::translucent(entry.color, alpha),
                );
            }
            LegendKind::Line { width } => {
                canvas.line(sx, ey, sx + swatch_w, ey, &LineStyle::solid(entry.color, width));
            }
        }

        canvas.text(sx + swatch_w + gap, ey, &entry.label, &text_style);
    }
}

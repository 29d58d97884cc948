use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::PlotConfig;
use crate::layout::axes::Axis;
use crate::layout::margins::PlotArea;
use crate::mathtext;
use crate::primitives::*;

/// Grid lines at every major tick. Drawn before the data.
pub fn draw_grid(canvas: &mut Canvas, area: &PlotArea, x_axis: &Axis, y_axis: &Axis, config: &PlotConfig) {
    if !config.grid.show {
        return;
    }
    let grid_style = LineStyle::solid(config.grid.color.with_alpha(config.grid.alpha), 0.6);

    for &val in &x_axis.tick_positions {
        let px = x_axis.data_to_pixel(val, area.left, area.right());
        if inside(px, area.left, area.right()) {
            canvas.line(px, area.top, px, area.bottom(), &grid_style);
        }
    }
    for &val in &y_axis.tick_positions {
        let py = y_axis.data_to_pixel(val, area.bottom(), area.top);
        if inside(py, area.top, area.bottom()) {
            canvas.line(area.left, py, area.right(), py, &grid_style);
        }
    }
}

/// Box frame with ticks, tick labels and axis labels. Drawn after the data.
pub fn draw_axes(canvas: &mut Canvas, area: &PlotArea, x_axis: &Axis, y_axis: &Axis, config: &PlotConfig) {
    let frame_color = Color::rgb(0, 0, 0);
    let frame_style = LineStyle::solid(frame_color, 0.8);
    let tick_line = LineStyle::solid(frame_color, 0.8);

    let inward = config.axes.tick_direction == "in";
    let tl = config.axes.tick_length;
    let dir = if inward { -1.0 } else { 1.0 };
    let outward = if inward { 0.0 } else { tl };

    canvas.line(area.left, area.top, area.right(), area.top, &frame_style);
    canvas.line(area.left, area.bottom(), area.right(), area.bottom(), &frame_style);
    canvas.line(area.left, area.top, area.left, area.bottom(), &frame_style);
    canvas.line(area.right(), area.top, area.right(), area.bottom(), &frame_style);

    let x_tick_label = TextStyle::sized(config.font.tick_size)
        .anchor(TextAnchor::Middle)
        .baseline(TextBaseline::Hanging);

    for (val, label) in x_axis.tick_positions.iter().zip(&x_axis.tick_labels) {
        let px = x_axis.data_to_pixel(*val, area.left, area.right());
        if !inside(px, area.left, area.right()) {
            continue;
        }
        canvas.line(px, area.bottom(), px, area.bottom() + dir * tl, &tick_line);
        canvas.text(px, area.bottom() + outward + 3.0, label, &x_tick_label);
    }

    let y_tick_label = TextStyle::sized(config.font.tick_size)
        .anchor(TextAnchor::End)
        .baseline(TextBaseline::Central);

    let mut widest = 0.0_f64;
    for (val, label) in y_axis.tick_positions.iter().zip(&y_axis.tick_labels) {
        let py = y_axis.data_to_pixel(*val, area.bottom(), area.top);
        if !inside(py, area.top, area.bottom()) {
            continue;
        }
        canvas.line(area.left, py, area.left - dir * tl, py, &tick_line);
        canvas.text(area.left - outward - 4.0, py, label, &y_tick_label);
        widest = widest.max(canvas.measure_text(label, &y_tick_label).width);
    }

    let label_style = TextStyle::sized(config.font.label_size).anchor(TextAnchor::Middle);

    if !x_axis.label.is_empty() {
        let y = area.bottom() + outward + config.font.tick_size + config.font.label_size + 8.0;
        let runs = mathtext::parse(&x_axis.label);
        canvas.text_runs(area.left + area.width / 2.0, y, &runs, &label_style, None);
    }

    if !y_axis.label.is_empty() {
        let x = area.left - outward - 8.0 - widest - 6.0;
        let y = area.top + area.height / 2.0;
        let runs = mathtext::parse(&y_axis.label);
        canvas.text_runs(x, y, &runs, &label_style, Some(-90.0));
    }
}

fn inside(px: f64, lo: f64, hi: f64) -> bool {
    px >= lo - 0.5 && px <= hi + 0.5
}

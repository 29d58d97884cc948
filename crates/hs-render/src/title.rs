use crate::canvas::Canvas;
use crate::config::PlotConfig;
use crate::layout::margins::PlotArea;
use crate::mathtext;
use crate::primitives::*;

/// Draw the figure title centred above the plot area.
pub fn draw_title(canvas: &mut Canvas, area: &PlotArea, title: &str, config: &PlotConfig) {
    if title.is_empty() {
        return;
    }
    let style = TextStyle::sized(config.font.title_size).anchor(TextAnchor::Middle);
    let runs = mathtext::parse(title);
    canvas.text_runs(area.left + area.width / 2.0, area.top - 8.0, &runs, &style, None);
}

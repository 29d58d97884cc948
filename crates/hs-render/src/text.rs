use ab_glyph::{Font, ScaleFont};

use crate::font::FontHandle;
use crate::mathtext::{Shift, TextRun};
use crate::primitives::TextStyle;

#[derive(Debug, Clone, Copy)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub ascent: f64,
}

/// Relative size of sub/superscript runs.
pub const SCRIPT_SCALE: f64 = 0.7;

/// Measure text width and height in points using ab_glyph.
pub fn measure_text<F: Font>(font: &F, text: &str, size_pt: f64) -> TextMetrics {
    let scale = ab_glyph::PxScale::from(size_pt as f32);
    let scaled = font.as_scaled(scale);

    let mut width: f32 = 0.0;
    let mut prev_glyph_id = None;
    for ch in text.chars() {
        let glyph_id = font.glyph_id(ch);
        if let Some(prev) = prev_glyph_id {
            width += scaled.kern(prev, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        prev_glyph_id = Some(glyph_id);
    }

    let ascent = scaled.ascent();
    let descent = scaled.descent();
    let height = ascent - descent;

    TextMetrics { width: width as f64, height: height as f64, ascent: ascent as f64 }
}

/// Measure text with a TextStyle, selecting the correct font face.
pub fn measure_styled(fonts: &FontHandle, text: &str, style: &TextStyle) -> TextMetrics {
    let font = fonts.select(style.weight, style.italic);
    measure_text(font, text, style.size)
}

/// Extent of mathtext runs; scripts are set smaller, math letters in italics.
pub fn measure_runs(fonts: &FontHandle, runs: &[TextRun], style: &TextStyle) -> TextMetrics {
    let mut width = 0.0;
    for r in runs {
        let scale = if r.shift == Shift::Normal { 1.0 } else { SCRIPT_SCALE };
        let font = fonts.select(style.weight, style.italic || r.italic);
        width += measure_text(font, &r.text, style.size * scale).width;
    }
    let base = measure_styled(fonts, "", style);
    TextMetrics { width, ..base }
}

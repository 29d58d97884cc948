use std::fmt::{self, Write as FmtWrite};

use crate::RenderError;
use crate::font::{FONT_FAMILY, FontHandle};
use crate::mathtext::{Shift, TextRun};
use crate::primitives::*;
use crate::text::{self, SCRIPT_SCALE, TextMetrics};

/// An SVG element stored for deferred rendering.
#[derive(Debug, Clone)]
enum SvgElement {
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        style: Style,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        style: LineStyle,
    },
    Polyline {
        points: Vec<(f64, f64)>,
        style: LineStyle,
    },
    Polygon {
        points: Vec<(f64, f64)>,
        style: Style,
    },
    Text {
        x: f64,
        y: f64,
        runs: Vec<TextRun>,
        style: TextStyle,
        rotate: Option<f64>,
    },
}

/// Immediate-mode SVG canvas. Coordinates in points (1pt = 1/72").
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    /// Elements tagged with the clip path active when they were drawn.
    elements: Vec<(SvgElement, Option<String>)>,
    defs: Vec<String>,
    clip_stack: Vec<String>,
    next_clip_id: usize,
    fonts: &'static FontHandle,
}

impl Canvas {
    /// Fails when no system font is available to measure text with.
    pub fn new(width: f64, height: f64) -> crate::Result<Self> {
        Ok(Self {
            width,
            height,
            elements: Vec::new(),
            defs: Vec::new(),
            clip_stack: Vec::new(),
            next_clip_id: 0,
            fonts: FontHandle::system()?,
        })
    }

    pub fn fonts(&self) -> &FontHandle {
        self.fonts
    }

    // --- Drawing primitives ---

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, style: &Style) {
        self.push(SvgElement::Rect { x, y, w, h, style: style.clone() });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: &LineStyle) {
        self.push(SvgElement::Line { x1, y1, x2, y2, style: style.clone() });
    }

    pub fn polyline(&mut self, points: &[(f64, f64)], style: &LineStyle) {
        if points.len() < 2 {
            return;
        }
        self.push(SvgElement::Polyline { points: points.to_vec(), style: style.clone() });
    }

    pub fn polygon(&mut self, points: &[(f64, f64)], style: &Style) {
        if points.len() < 3 {
            return;
        }
        self.push(SvgElement::Polygon { points: points.to_vec(), style: style.clone() });
    }

    pub fn text(&mut self, x: f64, y: f64, content: &str, style: &TextStyle) {
        self.text_runs(x, y, &[TextRun::plain(content)], style, None);
    }

    /// Text made of mathtext runs, optionally rotated about its anchor point.
    pub fn text_runs(
        &mut self,
        x: f64,
        y: f64,
        runs: &[TextRun],
        style: &TextStyle,
        rotate: Option<f64>,
    ) {
        if runs.iter().all(|r| r.text.is_empty()) {
            return;
        }
        self.push(SvgElement::Text { x, y, runs: runs.to_vec(), style: style.clone(), rotate });
    }

    // --- Clip paths ---

    /// Clip everything drawn until the matching [`Canvas::pop_clip`] to a rectangle.
    pub fn push_clip(&mut self, x: f64, y: f64, w: f64, h: f64) -> String {
        let id = format!("clip{}", self.next_clip_id);
        self.next_clip_id += 1;
        self.defs.push(format!(
            r#"<clipPath id="{id}"><rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" /></clipPath>"#
        ));
        self.clip_stack.push(id.clone());
        id
    }

    pub fn pop_clip(&mut self) {
        self.clip_stack.pop();
    }

    // --- Text measurement ---

    pub fn measure_text(&self, content: &str, style: &TextStyle) -> TextMetrics {
        text::measure_styled(self.fonts, content, style)
    }

    pub fn measure_runs(&self, runs: &[TextRun], style: &TextStyle) -> TextMetrics {
        text::measure_runs(self.fonts, runs, style)
    }

    // --- SVG output ---

    fn push(&mut self, elem: SvgElement) {
        self.elements.push((elem, self.clip_stack.last().cloned()));
    }

    pub fn finish_svg(&self) -> crate::Result<String> {
        let mut out = String::with_capacity(16 * 1024);
        self.write_svg(&mut out).map_err(|e| RenderError::Layout(e.to_string()))?;
        Ok(out)
    }

    fn write_svg(&self, out: &mut String) -> fmt::Result {
        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height,
        )?;

        if !self.defs.is_empty() {
            out.push_str("<defs>\n");
            for d in &self.defs {
                writeln!(out, "{d}")?;
            }
            out.push_str("</defs>\n");
        }

        writeln!(out, r#"<rect width="{}" height="{}" fill="white" />"#, self.width, self.height)?;

        // Consecutive elements sharing a clip are grouped under one <g>.
        let mut open: Option<&str> = None;
        for (elem, clip) in &self.elements {
            let clip = clip.as_deref();
            if clip != open {
                if open.is_some() {
                    out.push_str("</g>\n");
                }
                if let Some(id) = clip {
                    writeln!(out, r#"<g clip-path="url(#{id})">"#)?;
                }
                open = clip;
            }
            render_element(out, elem)?;
        }
        if open.is_some() {
            out.push_str("</g>\n");
        }

        out.push_str("</svg>\n");
        Ok(())
    }
}

fn render_element(out: &mut String, elem: &SvgElement) -> fmt::Result {
    match elem {
        SvgElement::Rect { x, y, w, h, style } => {
            write!(out, r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}""#)?;
            write_style_attrs(out, style)?;
        }
        SvgElement::Line { x1, y1, x2, y2, style } => {
            write!(out, r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}""#)?;
            write_line_attrs(out, style)?;
        }
        SvgElement::Polyline { points, style } => {
            out.push_str("<polyline");
            write_points(out, points)?;
            out.push_str(r#" fill="none" stroke-linejoin="miter""#);
            write_line_attrs(out, style)?;
        }
        SvgElement::Polygon { points, style } => {
            out.push_str("<polygon");
            write_points(out, points)?;
            write_style_attrs(out, style)?;
        }
        SvgElement::Text { x, y, runs, style, rotate } => {
            write!(out, r#"<text x="{x:.2}" y="{y:.2}""#)?;
            write!(out, r#" font-family="{FONT_FAMILY}" font-size="{:.1}""#, style.size)?;
            write!(out, r#" fill="{}""#, style.color.to_svg_fill())?;
            write!(out, r#" text-anchor="{}""#, style.anchor.as_str())?;
            write!(out, r#" dominant-baseline="{}""#, style.baseline.as_str())?;
            if style.weight == FontWeight::Bold {
                out.push_str(r#" font-weight="bold""#);
            }
            if style.italic {
                out.push_str(r#" font-style="italic""#);
            }
            if let Some(angle) = rotate {
                write!(out, r#" transform="rotate({angle:.1},{x:.2},{y:.2})""#)?;
            }
            out.push('>');
            write_runs(out, runs, style.size)?;
            out.push_str("</text>\n");
            return Ok(());
        }
    }
    out.push_str(" />\n");
    Ok(())
}

/// Emit runs as `<tspan>`s; scripts are shifted with relative `dy`.
fn write_runs(out: &mut String, runs: &[TextRun], size: f64) -> fmt::Result {
    if let [only] = runs
        && only.shift == Shift::Normal
        && !only.italic
    {
        escape_into(out, &only.text);
        return Ok(());
    }

    let mut offset = 0.0;
    for run in runs {
        let target = match run.shift {
            Shift::Normal => 0.0,
            Shift::Sub => size * 0.3,
            Shift::Super => -size * 0.45,
        };
        out.push_str("<tspan");
        if (target - offset).abs() > 1e-9 {
            write!(out, r#" dy="{:.2}""#, target - offset)?;
            offset = target;
        }
        if run.shift != Shift::Normal {
            write!(out, r#" font-size="{:.1}""#, size * SCRIPT_SCALE)?;
        }
        if run.italic {
            out.push_str(r#" font-style="italic""#);
        }
        out.push('>');
        escape_into(out, &run.text);
        out.push_str("</tspan>");
    }
    Ok(())
}

fn write_points(out: &mut String, points: &[(f64, f64)]) -> fmt::Result {
    out.push_str(r#" points=""#);
    for (i, (x, y)) in points.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        write!(out, "{x:.2},{y:.2}")?;
    }
    out.push('"');
    Ok(())
}

fn escape_into(out: &mut String, content: &str) {
    for ch in content.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

fn write_style_attrs(out: &mut String, style: &Style) -> fmt::Result {
    match &style.fill {
        Some(fill) => write!(out, r#" fill="{}""#, fill.to_svg_fill())?,
        None => out.push_str(r#" fill="none""#),
    }
    if let Some(stroke) = &style.stroke {
        write!(out, r#" stroke="{}""#, stroke.to_svg_fill())?;
        write!(out, r#" stroke-width="{:.2}""#, style.stroke_width)?;
    }
    if (style.opacity - 1.0).abs() > 1e-4 {
        write!(out, r#" opacity="{:.3}""#, style.opacity)?;
    }
    Ok(())
}

fn write_line_attrs(out: &mut String, style: &LineStyle) -> fmt::Result {
    write!(out, r#" stroke="{}""#, style.color.to_svg_fill())?;
    write!(out, r#" stroke-width="{:.2}""#, style.width)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::mathtext;

    #[test]
    fn empty_canvas() {
        let svg = Canvas::new(100.0, 50.0).unwrap().finish_svg().unwrap();
        assert!(svg.contains("width=\"100\""));
        assert!(svg.contains("height=\"50\""));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn rect_rendering() {
        let mut c = Canvas::new(200.0, 100.0).unwrap();
        c.rect(10.0, 20.0, 50.0, 30.0, &Style::filled(Color::hex("#ff0000")));
        let svg = c.finish_svg().unwrap();
        assert!(svg.contains(r##"fill="#ff0000""##));
        assert!(svg.contains("width=\"50.00\""));
    }

    #[test]
    fn text_is_escaped() {
        let mut c = Canvas::new(200.0, 100.0).unwrap();
        c.text(10.0, 20.0, "a < b & c", &TextStyle::default());
        let svg = c.finish_svg().unwrap();
        assert!(svg.contains(">a &lt; b &amp; c</text>"));
    }

    #[test]
    fn subscript_becomes_shifted_tspan() {
        let mut c = Canvas::new(200.0, 100.0).unwrap();
        c.text_runs(10.0, 20.0, &mathtext::parse("p$_T$ [GeV]"), &TextStyle::sized(10.0), None);
        let svg = c.finish_svg().unwrap();
        assert!(svg.contains(r#"<tspan>p</tspan>"#));
        assert!(svg.contains(r#"<tspan dy="3.00" font-size="7.0" font-style="italic">T</tspan>"#));
        assert!(svg.contains(r#"<tspan dy="-3.00"> [GeV]</tspan>"#));
    }

    #[test]
    fn clipped_elements_are_grouped() {
        let mut c = Canvas::new(100.0, 100.0).unwrap();
        c.line(0.0, 0.0, 1.0, 1.0, &LineStyle::default());
        let id = c.push_clip(10.0, 10.0, 50.0, 50.0);
        c.polyline(&[(0.0, 0.0), (5.0, 5.0)], &LineStyle::default());
        c.polygon(&[(0.0, 0.0), (5.0, 5.0), (5.0, 0.0)], &Style::filled(Color::rgb(1, 2, 3)));
        c.pop_clip();
        c.line(0.0, 0.0, 2.0, 2.0, &LineStyle::default());

        let svg = c.finish_svg().unwrap();
        assert!(svg.contains(&format!(r#"<clipPath id="{id}">"#)));
        assert_eq!(svg.matches(&format!(r#"<g clip-path="url(#{id})">"#)).count(), 1);
        let group = svg.split(r#"<g clip-path"#).nth(1).unwrap();
        let inside = &group[..group.find("</g>").unwrap()];
        assert!(inside.contains("<polyline"));
        assert!(inside.contains("<polygon"));
        assert!(!inside.contains("<line"));
    }

    #[test]
    fn measurement_uses_the_selected_face() {
        let c = Canvas::new(10.0, 10.0).unwrap();
        let style = TextStyle::sized(11.0).bold();
        let m = c.measure_text("Fully hadronic", &style);
        let direct = text::measure_text(&c.fonts().bold, "Fully hadronic", 11.0);
        approx::assert_relative_eq!(m.width, direct.width);
        approx::assert_relative_eq!(m.ascent, direct.ascent);
        assert!(m.width > c.measure_text("Signal", &style).width);
    }

    #[test]
    fn degenerate_shapes_are_dropped() {
        let mut c = Canvas::new(10.0, 10.0).unwrap();
        c.polyline(&[(1.0, 1.0)], &LineStyle::default());
        c.polygon(&[(1.0, 1.0), (2.0, 2.0)], &Style::default());
        let svg = c.finish_svg().unwrap();
        assert!(!svg.contains("<poly"));
    }
}

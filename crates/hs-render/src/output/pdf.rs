use crate::RenderError;

/// Convert an SVG document to PDF bytes.
///
/// Text is resolved against the shared system font database, the same one
/// layout measured it with.
pub fn svg_to_pdf(svg: &str) -> crate::Result<Vec<u8>> {
    let opt = usvg::Options { fontdb: crate::font::system_fontdb().clone(), ..usvg::Options::default() };

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| RenderError::Pdf(e.to_string()))?;

    svg2pdf::to_pdf(&tree, svg2pdf::ConversionOptions::default(), svg2pdf::PageOptions::default())
        .map_err(|e| RenderError::Pdf(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_svg_converts() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10"><rect width="20" height="10" fill="red"/></svg>"#;
        let pdf = svg_to_pdf(svg).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn malformed_svg_is_pdf_error() {
        assert!(matches!(svg_to_pdf("<svg"), Err(RenderError::Pdf(_))));
    }
}

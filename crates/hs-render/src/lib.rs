//! # hs-render
//!
//! Immediate-mode SVG rendering of 1D histograms: filled and outlined step
//! histograms, stacked signal/background figures and single-histogram figures.
//! SVG output is always available; PDF (`svg2pdf`) and PNG (`resvg`) sit behind
//! the `pdf` and `png` features.

pub mod canvas;
pub mod color;
pub mod config;
pub mod font;
pub mod layout;
pub mod mathtext;
pub mod output;
pub mod plots;
pub mod primitives;
pub mod text;
pub mod title;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::PlotConfig;
pub use plots::single::SinglePlot;
pub use plots::stacked::{StackMode, StackedPlot};
pub use plots::Step;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no {0} series to plot")]
    EmptySeries(&'static str),
    #[error("invalid series '{label}': {reason}")]
    InvalidSeries { label: String, reason: String },
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("layout error: {0}")]
    Layout(String),
    #[error("font error: {0}")]
    Font(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "png")]
    #[error("PNG encoding error: {0}")]
    Png(String),
    #[cfg(feature = "pdf")]
    #[error("PDF conversion error: {0}")]
    Pdf(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Image format written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pdf,
    Svg,
    Png,
}

impl OutputFormat {
    /// File extension (without the dot).
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "svg" => Ok(OutputFormat::Svg),
            "png" => Ok(OutputFormat::Png),
            other => Err(RenderError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Convert a finished SVG document to bytes in `format`.
pub fn render_to_bytes(svg: &str, format: OutputFormat, config: &PlotConfig) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Svg => Ok(svg.as_bytes().to_vec()),
        #[cfg(feature = "pdf")]
        OutputFormat::Pdf => output::pdf::svg_to_pdf(svg),
        #[cfg(feature = "png")]
        OutputFormat::Png => output::png::svg_to_png(svg, config.output.dpi),
        #[allow(unreachable_patterns)]
        other => {
            let _ = config;
            Err(RenderError::UnsupportedFormat(format!("{other} (feature not enabled)")))
        }
    }
}

/// Write a finished SVG document to `path` as `format`. Existing files are overwritten.
pub fn render_to_file(
    svg: &str,
    path: &Path,
    format: OutputFormat,
    config: &PlotConfig,
) -> Result<()> {
    match format {
        OutputFormat::Svg => output::svg::save_svg(svg, path),
        _ => {
            let bytes = render_to_bytes(svg, format, config)?;
            std::fs::write(path, bytes)?;
            Ok(())
        }
    }
}

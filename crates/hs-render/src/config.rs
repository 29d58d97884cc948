use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Figure styling (YAML or programmatic). Every field has a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub figure: FigureConfig,
    pub font: FontConfig,
    pub axes: AxesConfig,
    pub grid: GridConfig,
    pub colors: ColorsConfig,
    /// Palette cycled for background series after the first.
    pub palette: String,
    pub output: OutputConfig,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            figure: FigureConfig::default(),
            font: FontConfig::default(),
            axes: AxesConfig::default(),
            grid: GridConfig::default(),
            colors: ColorsConfig::default(),
            palette: "tab10".into(),
            output: OutputConfig::default(),
        }
    }
}

impl PlotConfig {
    pub fn palette_colors(&self) -> Vec<Color> {
        crate::color::palette_colors(&self.palette)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: 576.0,  // 8" * 72
            height: 432.0, // 6" * 72
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub title_size: f64,
    pub label_size: f64,
    pub tick_size: f64,
    pub legend_size: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self { title_size: 12.0, label_size: 11.0, tick_size: 9.0, legend_size: 10.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesConfig {
    /// `"in"` or `"out"`.
    pub tick_direction: String,
    pub tick_length: f64,
    pub target_ticks: usize,
    /// Headroom above the tallest bin, as a fraction of it.
    pub y_headroom: f64,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self { tick_direction: "out".into(), tick_length: 3.5, target_ticks: 6, y_headroom: 0.05 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub show: bool,
    pub color: Color,
    pub alpha: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { show: true, color: Color::hex("#b0b0b0"), alpha: 0.8 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub background: Color,
    pub signal: Color,
    /// Outline of single-file histograms.
    pub single: Color,
    pub background_alpha: f64,
    pub signal_line_width: f64,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            background: Color::hex("#1f77b4"),
            signal: Color::hex("#ff7f0e"),
            single: Color::hex("#1f77b4"),
            background_alpha: 0.5,
            signal_line_width: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dpi: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dpi: 100 }
    }
}

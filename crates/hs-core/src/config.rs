//! Run configuration (`histstack run --config`).

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use hs_render::{OutputFormat, PlotConfig, StackMode};
use serde::{Deserialize, Serialize};

use crate::classify::ClassificationPolicy;
use crate::error::{Error, Result};

/// Which figures a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Signal vs background per histogram and variation, summed over files.
    #[default]
    Aggregated,
    /// Every histogram of every file on its own.
    Single,
    Both,
}

impl Mode {
    pub fn aggregated(self) -> bool {
        matches!(self, Mode::Aggregated | Mode::Both)
    }

    pub fn single(self) -> bool {
        matches!(self, Mode::Single | Mode::Both)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Aggregated => "aggregated",
            Mode::Single => "single",
            Mode::Both => "both",
        })
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "aggregated" => Ok(Mode::Aggregated),
            "single" => Ok(Mode::Single),
            "both" => Ok(Mode::Both),
            other => Err(Error::Config(format!("unknown mode: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HiststackConfig {
    /// Glob selecting input ROOT files.
    pub input_glob: String,
    /// Directory receiving the figures (created if missing).
    pub output_dir: PathBuf,
    pub mode: Mode,
    pub classification_policy: ClassificationPolicy,
    pub stack_mode: StackMode,
    pub format: OutputFormat,
    pub plot: PlotConfig,
}

impl Default for HiststackConfig {
    fn default() -> Self {
        Self {
            input_glob: "root_hists/*.root".into(),
            output_dir: PathBuf::from("plots"),
            mode: Mode::default(),
            classification_policy: ClassificationPolicy::default(),
            stack_mode: StackMode::default(),
            format: OutputFormat::default(),
            plot: PlotConfig::default(),
        }
    }
}

impl HiststackConfig {
    /// Load from YAML, or JSON when the extension is `.json`.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("").to_ascii_lowercase();
        let parsed: std::result::Result<Self, String> = if ext == "json" {
            serde_json::from_slice(&bytes).map_err(|e| e.to_string())
        } else {
            serde_yaml_ng::from_slice(&bytes).map_err(|e| e.to_string())
        };
        parsed.map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }
}

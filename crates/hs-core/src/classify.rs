//! File-name based provenance labels.
//!
//! Only the base name of a path is inspected, never its contents or parent
//! directories.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Variation assigned when a file name carries no systematic token.
pub const NOMINAL_VARIATION: &str = "SM";

const BACKGROUND_TOKENS: [&str; 2] = ["leplep", "hadhad"];
const SIGNAL_TOKENS: [&str; 2] = ["lephad", "hadlep"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Signal,
    Background,
    Unknown,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Classification::Signal => "signal",
            Classification::Background => "background",
            Classification::Unknown => "unknown",
        })
    }
}

/// What happens to names that carry no background token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationPolicy {
    /// Everything that is not background is signal.
    #[default]
    Legacy,
    /// Signal requires a `lephad`/`hadlep` token; anything else is unknown.
    Strict,
}

impl fmt::Display for ClassificationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClassificationPolicy::Legacy => "legacy",
            ClassificationPolicy::Strict => "strict",
        })
    }
}

impl FromStr for ClassificationPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" => Ok(ClassificationPolicy::Legacy),
            "strict" => Ok(ClassificationPolicy::Strict),
            other => Err(Error::Config(format!("unknown classification policy: {other}"))),
        }
    }
}

fn base_name(file: &str) -> &str {
    Path::new(file).file_name().and_then(|n| n.to_str()).unwrap_or(file)
}

/// Signal/background label from the file's base name (case-insensitive).
pub fn classify_file(file: &str, policy: ClassificationPolicy) -> Classification {
    let name = base_name(file).to_lowercase();
    if BACKGROUND_TOKENS.iter().any(|t| name.contains(t)) {
        return Classification::Background;
    }
    match policy {
        ClassificationPolicy::Legacy => Classification::Signal,
        ClassificationPolicy::Strict if SIGNAL_TOKENS.iter().any(|t| name.contains(t)) => {
            Classification::Signal
        }
        ClassificationPolicy::Strict => Classification::Unknown,
    }
}

/// Systematic variation token from the file's base name.
///
/// With more than two `_`-separated parts, the second-to-last part is the
/// variation when it contains `up` or `down` (case-sensitive); otherwise
/// [`NOMINAL_VARIATION`].
pub fn extract_variation(file: &str) -> String {
    let parts: Vec<&str> = base_name(file).split('_').collect();
    if parts.len() > 2 {
        let candidate = parts[parts.len() - 2];
        if candidate.contains("down") || candidate.contains("up") {
            return candidate.to_string();
        }
    }
    NOMINAL_VARIATION.to_string()
}

/// An input file and the labels derived from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub classification: Classification,
    pub variation: String,
}

impl FileRecord {
    pub fn new(path: impl Into<PathBuf>, policy: ClassificationPolicy) -> Self {
        let path = path.into();
        let name = path.to_string_lossy();
        let classification = classify_file(&name, policy);
        let variation = extract_variation(&name);
        Self { path, classification, variation }
    }
}

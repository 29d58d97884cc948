//! Error types for histstack

use std::path::PathBuf;

use thiserror::Error;

use crate::series::{LayoutMismatch, ShapeError};

/// histstack error type
#[derive(Error, Debug)]
pub enum Error {
    /// Two series with the same aggregation key have different bin edges.
    #[error("incompatible bin layout for histogram '{name}': {source}")]
    IncompatibleBinLayout {
        name: String,
        #[source]
        source: LayoutMismatch,
    },

    /// A histogram read from a container does not form a valid series.
    #[error("invalid series '{name}': {source}")]
    InvalidSeries {
        name: String,
        #[source]
        source: ShapeError,
    },

    /// ROOT reader error
    #[error(transparent)]
    Root(#[from] hs_root::RootError),

    /// Rendering error
    #[error(transparent)]
    Render(#[from] hs_render::RenderError),

    /// Failure while processing one input file.
    #[error("{}: {source}", .path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed glob pattern
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// Unreadable path while expanding a glob
    #[error("glob expansion: {0}")]
    Glob(#[from] glob::GlobError),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Attach the input file being processed.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        Error::InFile { path: path.into(), source: Box::new(self) }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

//! # hs-core
//!
//! The histstack pipeline: discover ROOT files, label each one as signal or
//! background (plus a systematic variation) from its name, sum same-named 1D
//! histograms per label, and write one signal-vs-background figure per
//! histogram and variation.
//!
//! ```no_run
//! use hs_core::{HiststackConfig, pipeline};
//!
//! let config = HiststackConfig::default();
//! let report = pipeline::run(&config).unwrap();
//! println!("{} plots written", report.plots_written.len());
//! ```

#![warn(clippy::all)]

pub mod aggregate;
pub mod axis_label;
pub mod classify;
pub mod config;
pub mod discover;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod series;

pub use aggregate::{AggregationKey, AggregationStore};
pub use classify::{Classification, ClassificationPolicy, FileRecord, classify_file, extract_variation};
pub use config::{HiststackConfig, Mode};
pub use error::{Error, Result};
pub use extract::{Container, ContainerOpener, RootOpener};
pub use pipeline::RunReport;
pub use series::HistogramSeries;

//! Reading histogram series out of a container file.

use std::path::Path;

use hs_root::{KeyInfo, RootError, RootFile};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::series::HistogramSeries;

/// Class-name prefix of histogram entries.
pub const HISTOGRAM_CLASS_PREFIX: &str = "TH";

/// A keyed store of histogram objects.
pub trait Container {
    /// Name used in diagnostics.
    fn describe(&self) -> String;

    /// Whether an entry exists under `name`.
    fn contains(&self, name: &str) -> Result<bool>;

    /// Every entry, nested ones as `dir/name`.
    fn keys(&self) -> Result<Vec<KeyInfo>>;

    /// Read the entry at `name` as a series.
    fn get(&self, name: &str) -> Result<HistogramSeries>;

    /// Names of entries whose class starts with `TH`, in listing order.
    fn histogram_names(&self) -> Result<Vec<String>> {
        Ok(self
            .keys()?
            .into_iter()
            .filter(|k| k.class_name.starts_with(HISTOGRAM_CLASS_PREFIX))
            .map(|k| k.name)
            .collect())
    }
}

/// Opens containers by path, one at a time.
pub trait ContainerOpener {
    type Container: Container;

    fn open(&self, path: &Path) -> Result<Self::Container>;
}

impl Container for RootFile {
    fn describe(&self) -> String {
        self.path().display().to_string()
    }

    fn contains(&self, name: &str) -> Result<bool> {
        Ok(RootFile::contains(self, name)?)
    }

    fn keys(&self) -> Result<Vec<KeyInfo>> {
        Ok(self.walk_keys()?)
    }

    fn get(&self, name: &str) -> Result<HistogramSeries> {
        let h = self.get_histogram(name)?;
        HistogramSeries::new(h.bin_edges, h.bin_content)
            .map_err(|source| Error::InvalidSeries { name: name.to_string(), source })
    }
}

/// Opens ROOT files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct RootOpener;

impl ContainerOpener for RootOpener {
    type Container = RootFile;

    fn open(&self, path: &Path) -> Result<RootFile> {
        Ok(RootFile::open(path)?)
    }
}

/// Read one histogram; `None` (with a warning) when it is missing or not a 1D histogram.
pub fn extract<C: Container + ?Sized>(container: &C, name: &str) -> Result<Option<HistogramSeries>> {
    if !container.contains(name)? {
        warn!("histogram {name} not found in {}", container.describe());
        return Ok(None);
    }
    match container.get(name) {
        Ok(series) => {
            debug!(name, bins = series.n_bins(), total = series.total(), "histogram read");
            Ok(Some(series))
        }
        Err(Error::Root(RootError::UnsupportedClass(class))) => {
            warn!("skipping {name} in {}: {class} is not a 1D histogram", container.describe());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Read every histogram entry, skipping the ones [`extract`] skips.
pub fn extract_all<C: Container + ?Sized>(container: &C) -> Result<Vec<(String, HistogramSeries)>> {
    let mut out = Vec::new();
    for name in container.histogram_names()? {
        if let Some(series) = extract(container, &name)? {
            out.push((name, series));
        }
    }
    Ok(out)
}

//! The histogram type returned by [`RootFile::get_histogram`](crate::RootFile::get_histogram).

/// A 1D histogram read from a ROOT file, with under/overflow bins removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Object name.
    pub name: String,
    /// Object title.
    pub title: String,
    /// Class the histogram was stored as (`TH1D`, `TH1F`, ...).
    pub class_name: String,
    /// Bin edges; `n_bins + 1` entries.
    pub bin_edges: Vec<f64>,
    /// Bin contents; `n_bins` entries.
    pub bin_content: Vec<f64>,
    /// Per-bin sum of squared weights, when stored.
    pub sumw2: Option<Vec<f64>>,
    /// Recorded number of entries (`fEntries`).
    pub entries: f64,
}

impl Histogram {
    /// Number of bins, excluding under/overflow.
    pub fn n_bins(&self) -> usize {
        self.bin_content.len()
    }
}

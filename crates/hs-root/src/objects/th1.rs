//! TH1 streamer decoding.
//!
//! Layout of a streamed `TH1x` (only the parts read here):
//! ```text
//! TH1x                        version + byte count
//!   TH1                       version + byte count
//!     TNamed                  fName, fTitle
//!     TAttLine, TAttFill, TAttMarker   skipped via byte count
//!     fNcells                 i32
//!     fXaxis                  TAxis: fNbins, fXmin, fXmax, fXbins
//!     fYaxis, fZaxis          skipped via byte count
//!     fBarOffset, fBarWidth   i16
//!     fEntries .. fTsumwx2    5 x f64
//!     fMaximum, fMinimum      f64 (TH1 v2+)
//!     fNormFactor             f64 (TH1 v3+)
//!     fContour, fSumw2        TArrayD
//!     ...                     skipped up to the TH1 byte-count end
//!   TArray{D,F,I,S,C}         fNcells bin contents, under/overflow included
//! ```

use crate::error::{Result, RootError};
use crate::histogram::Histogram;
use crate::rbuffer::{ArrayElem, RBuffer};

struct AxisInfo {
    n_bins: usize,
    x_min: f64,
    x_max: f64,
    /// Explicit edges for variable binning; empty when uniform.
    edges: Vec<f64>,
}

impl AxisInfo {
    fn bin_edges(&self) -> Vec<f64> {
        if !self.edges.is_empty() {
            return self.edges.clone();
        }
        let width = (self.x_max - self.x_min) / self.n_bins as f64;
        (0..=self.n_bins).map(|i| self.x_min + i as f64 * width).collect()
    }
}

struct Th1Base {
    name: String,
    title: String,
    n_cells: usize,
    x_axis: AxisInfo,
    entries: f64,
    sumw2: Vec<f64>,
}

/// Decode a one-dimensional histogram whose contents are stored as `elem`.
pub(crate) fn read_th1(data: &[u8], class_name: &str, elem: ArrayElem) -> Result<Histogram> {
    let mut r = RBuffer::new(data);
    let (version, _end) = r.read_version()?;
    if version < 1 {
        return Err(RootError::Deserialization(format!("unsupported {class_name} version {version}")));
    }

    let base = read_th1_base(&mut r)?;
    let raw = r.read_tarray(elem)?;
    if raw.len() != base.n_cells {
        return Err(RootError::Deserialization(format!(
            "{class_name} '{}': content array has {} cells, fNcells is {}",
            base.name,
            raw.len(),
            base.n_cells
        )));
    }

    finish(base, class_name, &raw)
}

fn read_th1_base(r: &mut RBuffer) -> Result<Th1Base> {
    let (version, end) = r.read_version()?;

    let (name, title) = r.read_tnamed()?;
    r.skip_object()?; // TAttLine
    r.skip_object()?; // TAttFill
    r.skip_object()?; // TAttMarker

    let n_cells = r.read_i32()?;
    let n_cells = usize::try_from(n_cells)
        .map_err(|_| RootError::Deserialization(format!("negative fNcells {n_cells}")))?;

    let x_axis = read_taxis(r)?;
    r.skip_object()?; // fYaxis
    r.skip_object()?; // fZaxis

    let _bar_offset = r.read_i16()?;
    let _bar_width = r.read_i16()?;
    let entries = r.read_f64()?;
    for _ in 0..4 {
        // fTsumw, fTsumw2, fTsumwx, fTsumwx2
        r.read_f64()?;
    }
    if version >= 2 {
        let _maximum = r.read_f64()?;
        let _minimum = r.read_f64()?;
    }
    if version >= 3 {
        let _norm_factor = r.read_f64()?;
    }
    let _contour = r.read_tarray(ArrayElem::F64)?;
    let sumw2 = r.read_tarray(ArrayElem::F64)?;

    // fOption, fFunctions, fBuffer and later members are not needed.
    match end {
        Some(end) => r.seek_forward(end)?,
        None => {
            return Err(RootError::Deserialization(
                "TH1 streamed without a byte count".into(),
            ));
        }
    }

    Ok(Th1Base { name, title, n_cells, x_axis, entries, sumw2 })
}

fn read_taxis(r: &mut RBuffer) -> Result<AxisInfo> {
    let (_version, end) = r.read_version()?;
    r.read_tnamed()?;
    r.skip_object()?; // TAttAxis

    let n_bins = r.read_i32()?;
    let n_bins = usize::try_from(n_bins)
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| RootError::Deserialization(format!("axis with {n_bins} bins")))?;
    let x_min = r.read_f64()?;
    let x_max = r.read_f64()?;
    let edges = r.read_tarray(ArrayElem::F64)?;
    if !edges.is_empty() && edges.len() != n_bins + 1 {
        return Err(RootError::Deserialization(format!(
            "axis declares {n_bins} bins but stores {} edges",
            edges.len()
        )));
    }

    if let Some(end) = end {
        r.seek_forward(end)?;
    }
    Ok(AxisInfo { n_bins, x_min, x_max, edges })
}

fn finish(base: Th1Base, class_name: &str, raw: &[f64]) -> Result<Histogram> {
    let n_bins = base.x_axis.n_bins;
    // raw = [underflow, bin 1 .. bin n, overflow]
    if raw.len() != n_bins + 2 {
        return Err(RootError::Deserialization(format!(
            "{} cells do not match {n_bins} bins plus under/overflow",
            raw.len()
        )));
    }
    let inner = 1..=n_bins;
    let sumw2 = (base.sumw2.len() == raw.len()).then(|| base.sumw2[inner.clone()].to_vec());

    Ok(Histogram {
        name: base.name,
        title: base.title,
        class_name: class_name.to_string(),
        bin_edges: base.x_axis.bin_edges(),
        bin_content: raw[inner].to_vec(),
        sumw2,
        entries: base.entries,
    })
}

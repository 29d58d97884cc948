//! Bin edges paired with bin values.

use hs_render::Step;
use thiserror::Error;

/// Why a pair of edge/value sequences is not a histogram.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("histogram has no bins")]
    NoBins,
    #[error("{edges} edges for {values} values (expected values + 1)")]
    EdgeCount { edges: usize, values: usize },
    #[error("bin edge {index} is not finite")]
    NonFiniteEdge { index: usize },
    #[error("bin edges not strictly increasing at index {index}")]
    NotIncreasing { index: usize },
}

/// Why two series cannot be summed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutMismatch {
    #[error("{left} bins vs {right} bins")]
    BinCount { left: usize, right: usize },
    #[error("edge {index} differs ({left} vs {right})")]
    Edge { index: usize, left: f64, right: f64 },
}

/// A 1D histogram: `edges.len() == values.len() + 1`, edges strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSeries {
    edges: Vec<f64>,
    values: Vec<f64>,
}

impl HistogramSeries {
    pub fn new(edges: Vec<f64>, values: Vec<f64>) -> Result<Self, ShapeError> {
        if values.is_empty() {
            return Err(ShapeError::NoBins);
        }
        if edges.len() != values.len() + 1 {
            return Err(ShapeError::EdgeCount { edges: edges.len(), values: values.len() });
        }
        if let Some(index) = edges.iter().position(|e| !e.is_finite()) {
            return Err(ShapeError::NonFiniteEdge { index });
        }
        if let Some(index) = edges.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ShapeError::NotIncreasing { index: index + 1 });
        }
        Ok(Self { edges, values })
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn n_bins(&self) -> usize {
        self.values.len()
    }

    /// Sum of all bin values.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Compare bin layouts; edges must match exactly.
    pub fn check_layout(&self, other: &HistogramSeries) -> Result<(), LayoutMismatch> {
        if self.edges.len() != other.edges.len() {
            return Err(LayoutMismatch::BinCount { left: self.n_bins(), right: other.n_bins() });
        }
        match self.edges.iter().zip(&other.edges).position(|(a, b)| a != b) {
            Some(index) => Err(LayoutMismatch::Edge {
                index,
                left: self.edges[index],
                right: other.edges[index],
            }),
            None => Ok(()),
        }
    }

    /// Element-wise `self += other`. Leaves `self` untouched on mismatch.
    pub fn add_assign(&mut self, other: &HistogramSeries) -> Result<(), LayoutMismatch> {
        self.check_layout(other)?;
        for (v, o) in self.values.iter_mut().zip(&other.values) {
            *v += o;
        }
        Ok(())
    }

    /// Borrowed view for the renderer.
    pub fn as_step(&self) -> Step<'_> {
        Step::new(&self.edges, &self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(edges: &[f64], values: &[f64]) -> HistogramSeries {
        HistogramSeries::new(edges.to_vec(), values.to_vec()).unwrap()
    }

    #[test]
    fn shape_is_validated() {
        assert_eq!(HistogramSeries::new(vec![0.0], vec![]), Err(ShapeError::NoBins));
        assert_eq!(
            HistogramSeries::new(vec![0.0, 1.0], vec![1.0, 2.0]),
            Err(ShapeError::EdgeCount { edges: 2, values: 2 })
        );
        assert_eq!(
            HistogramSeries::new(vec![0.0, 2.0, 1.0], vec![1.0, 2.0]),
            Err(ShapeError::NotIncreasing { index: 2 })
        );
        assert_eq!(
            HistogramSeries::new(vec![0.0, f64::INFINITY], vec![1.0]),
            Err(ShapeError::NonFiniteEdge { index: 1 })
        );
    }

    #[test]
    fn add_sums_values_keeps_edges() {
        let mut a = series(&[0.0, 1.0, 2.0], &[1.0, 2.0]);
        a.add_assign(&series(&[0.0, 1.0, 2.0], &[10.0, 20.0])).unwrap();
        assert_eq!(a.values(), &[11.0, 22.0]);
        assert_eq!(a.edges(), &[0.0, 1.0, 2.0]);
        assert_eq!(a.total(), 33.0);
    }

    #[test]
    fn mismatched_layouts_are_rejected_without_mutation() {
        let mut a = series(&[0.0, 1.0, 2.0], &[1.0, 2.0]);
        let shifted = series(&[0.0, 1.5, 2.0], &[1.0, 1.0]);
        assert_eq!(
            a.add_assign(&shifted),
            Err(LayoutMismatch::Edge { index: 1, left: 1.0, right: 1.5 })
        );
        assert_eq!(
            a.add_assign(&series(&[0.0, 2.0], &[5.0])),
            Err(LayoutMismatch::BinCount { left: 2, right: 1 })
        );
        assert_eq!(a.values(), &[1.0, 2.0]);
    }
}

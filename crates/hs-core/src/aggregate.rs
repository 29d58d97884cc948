//! Per-(variation, classification, histogram) sums across input files.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use tracing::debug;

use crate::classify::Classification;
use crate::error::{Error, Result};
use crate::series::HistogramSeries;

/// Identifies one accumulated series.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AggregationKey {
    pub variation: String,
    pub classification: Classification,
    pub name: String,
}

impl AggregationKey {
    pub fn new(
        variation: impl Into<String>,
        classification: Classification,
        name: impl Into<String>,
    ) -> Self {
        Self { variation: variation.into(), classification, name: name.into() }
    }
}

type ByName = BTreeMap<String, HistogramSeries>;

static EMPTY: ByName = ByName::new();

/// variation → classification → histogram name → summed series.
///
/// Sorted maps keep iteration, and therefore plot order, deterministic.
#[derive(Debug, Clone, Default)]
pub struct AggregationStore {
    inner: BTreeMap<String, BTreeMap<Classification, ByName>>,
}

/// One signal/background pair ready to plot.
#[derive(Debug, Clone, Copy)]
pub struct PlotPair<'a> {
    pub variation: &'a str,
    pub name: &'a str,
    pub signal: &'a HistogramSeries,
    pub background: &'a HistogramSeries,
}

/// A histogram name present in only one partition of a variation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unpaired {
    pub variation: String,
    pub name: String,
    pub present_in: Classification,
}

impl AggregationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `series` under `key`, or add it element-wise to what is already there.
    ///
    /// Fails with [`Error::IncompatibleBinLayout`] when the edges differ; the
    /// stored series is left unchanged in that case.
    pub fn merge(&mut self, key: AggregationKey, series: HistogramSeries) -> Result<()> {
        let by_name = self
            .inner
            .entry(key.variation)
            .or_default()
            .entry(key.classification)
            .or_default();
        match by_name.entry(key.name) {
            Entry::Vacant(slot) => {
                slot.insert(series);
            }
            Entry::Occupied(mut slot) => {
                let name = slot.key().clone();
                slot.get_mut()
                    .add_assign(&series)
                    .map_err(|source| Error::IncompatibleBinLayout { name: name.clone(), source })?;
                debug!(name = %name, total = slot.get().total(), "merged histogram");
            }
        }
        Ok(())
    }

    pub fn get(&self, variation: &str, classification: Classification, name: &str) -> Option<&HistogramSeries> {
        self.inner.get(variation)?.get(&classification)?.get(name)
    }

    /// Variations in sorted order.
    pub fn variations(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    /// Number of stored series.
    pub fn len(&self) -> usize {
        self.inner.values().flat_map(|c| c.values()).map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names present as both signal and background, per variation, plus the
    /// names that appear on only one side.
    pub fn plot_pairs(&self) -> (Vec<PlotPair<'_>>, Vec<Unpaired>) {
        let mut pairs = Vec::new();
        let mut unpaired = Vec::new();

        for (variation, classes) in &self.inner {
            let signal = classes.get(&Classification::Signal).unwrap_or(&EMPTY);
            let background = classes.get(&Classification::Background).unwrap_or(&EMPTY);

            for (name, sig) in signal {
                match background.get(name) {
                    Some(bkg) => pairs.push(PlotPair { variation, name, signal: sig, background: bkg }),
                    None => unpaired.push(Unpaired {
                        variation: variation.clone(),
                        name: name.clone(),
                        present_in: Classification::Signal,
                    }),
                }
            }
            for name in background.keys().filter(|n| !signal.contains_key(*n)) {
                unpaired.push(Unpaired {
                    variation: variation.clone(),
                    name: name.clone(),
                    present_in: Classification::Background,
                });
            }
        }
        (pairs, unpaired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Classification::{Background, Signal};

    fn series(values: &[f64]) -> HistogramSeries {
        let edges: Vec<f64> = (0..=values.len()).map(|i| i as f64 * 10.0).collect();
        HistogramSeries::new(edges, values.to_vec()).unwrap()
    }

    fn key(variation: &str, class: Classification, name: &str) -> AggregationKey {
        AggregationKey::new(variation, class, name)
    }

    #[test]
    fn first_merge_stores_as_is() {
        let mut store = AggregationStore::new();
        store.merge(key("SM", Signal, "jet_pt"), series(&[1.0, 2.0])).unwrap();
        assert_eq!(store.get("SM", Signal, "jet_pt").unwrap().values(), &[1.0, 2.0]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn merge_is_order_independent() {
        let a = series(&[1.0, 2.5, 3.0]);
        let b = series(&[0.5, 4.0, 7.0]);

        let mut ab = AggregationStore::new();
        ab.merge(key("SM", Background, "m"), a.clone()).unwrap();
        ab.merge(key("SM", Background, "m"), b.clone()).unwrap();

        let mut ba = AggregationStore::new();
        ba.merge(key("SM", Background, "m"), b).unwrap();
        ba.merge(key("SM", Background, "m"), a).unwrap();

        assert_eq!(ab.get("SM", Background, "m"), ba.get("SM", Background, "m"));
    }

    #[test]
    fn merging_same_series_twice_doubles() {
        let mut store = AggregationStore::new();
        let s = series(&[1.0, 2.0, 3.0]);
        store.merge(key("SM", Signal, "eta"), s.clone()).unwrap();
        store.merge(key("SM", Signal, "eta"), s).unwrap();
        assert_eq!(store.get("SM", Signal, "eta").unwrap().values(), &[2.0, 4.0, 6.0]);
    }

    #[test]
    fn mismatched_edges_fail_and_name_the_histogram() {
        let mut store = AggregationStore::new();
        store.merge(key("SM", Signal, "mass_reco"), series(&[1.0, 2.0])).unwrap();
        let err = store.merge(key("SM", Signal, "mass_reco"), series(&[1.0, 2.0, 3.0])).unwrap_err();
        assert!(matches!(&err, Error::IncompatibleBinLayout { name, .. } if name == "mass_reco"));
        assert_eq!(store.get("SM", Signal, "mass_reco").unwrap().values(), &[1.0, 2.0]);
    }

    #[test]
    fn keys_partition_independently() {
        let mut store = AggregationStore::new();
        store.merge(key("SM", Signal, "h"), series(&[1.0])).unwrap();
        store.merge(key("JESup", Signal, "h"), series(&[5.0])).unwrap();
        store.merge(key("SM", Background, "h"), series(&[7.0])).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.variations().collect::<Vec<_>>(), vec!["JESup", "SM"]);
        assert_eq!(store.get("SM", Signal, "h").unwrap().values(), &[1.0]);
    }

    #[test]
    fn pairs_need_both_partitions() {
        let mut store = AggregationStore::new();
        store.merge(key("SM", Signal, "mass_reco"), series(&[1.0])).unwrap();
        store.merge(key("SM", Signal, "jet_pt"), series(&[2.0])).unwrap();
        store.merge(key("SM", Background, "jet_pt"), series(&[3.0])).unwrap();
        store.merge(key("SM", Background, "lep_eta"), series(&[4.0])).unwrap();

        let (pairs, unpaired) = store.plot_pairs();
        assert_eq!(pairs.len(), 1);
        assert_eq!((pairs[0].variation, pairs[0].name), ("SM", "jet_pt"));
        assert_eq!(pairs[0].signal.values(), &[2.0]);
        assert_eq!(pairs[0].background.values(), &[3.0]);

        let names: Vec<(&str, Classification)> =
            unpaired.iter().map(|u| (u.name.as_str(), u.present_in)).collect();
        assert_eq!(names, vec![("mass_reco", Signal), ("lep_eta", Background)]);
    }

    #[test]
    fn pairs_outlive_a_missing_partition() {
        let mut store = AggregationStore::new();
        store.merge(key("JESup", Signal, "jet_pt"), series(&[1.0])).unwrap();
        store.merge(key("SM", Background, "jet_pt"), series(&[2.0])).unwrap();
        store.merge(key("SM", Signal, "jet_pt"), series(&[3.0])).unwrap();

        let (pairs, unpaired) = store.plot_pairs();
        drop(unpaired);
        let found: Vec<(&str, &str, f64)> =
            pairs.iter().map(|p| (p.variation, p.name, p.signal.total())).collect();
        assert_eq!(found, vec![("SM", "jet_pt", 3.0)]);
    }
}

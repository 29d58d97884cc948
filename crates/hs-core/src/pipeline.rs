//! discover → classify → extract → aggregate → render.

use std::path::{Path, PathBuf};

use hs_render::plots::{single, stacked};
use hs_render::{SinglePlot, StackedPlot};
use tracing::{debug, info, warn};

use crate::aggregate::{AggregationKey, AggregationStore};
use crate::axis_label::resolve_xlabel;
use crate::classify::{Classification, FileRecord};
use crate::config::HiststackConfig;
use crate::discover::discover;
use crate::error::Result;
use crate::extract::{Container, ContainerOpener, RootOpener, extract};

/// What a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub files_processed: usize,
    /// Files left out of aggregation because their class is unknown.
    pub files_unclassified: Vec<PathBuf>,
    /// Every figure written, in order.
    pub plots_written: Vec<PathBuf>,
    /// `(variation, histogram)` pairs lacking a signal or background aggregate.
    pub skipped: Vec<(String, String)>,
}

/// Run the pipeline over the files matching `config.input_glob`.
pub fn run(config: &HiststackConfig) -> Result<RunReport> {
    let files = discover(&config.input_glob)?;
    info!("found {} input file(s) matching {}", files.len(), config.input_glob);
    run_files(config, &files, &RootOpener)
}

/// Run the pipeline over an explicit file list.
///
/// Files are opened one at a time and dropped before the next is opened; the
/// first failing file aborts the run.
pub fn run_files<O: ContainerOpener>(
    config: &HiststackConfig,
    files: &[PathBuf],
    opener: &O,
) -> Result<RunReport> {
    std::fs::create_dir_all(&config.output_dir)?;

    let mut report = RunReport::default();
    let mut store = AggregationStore::new();

    for path in files {
        let record = FileRecord::new(path.clone(), config.classification_policy);
        info!(
            file = %path.display(),
            classification = %record.classification,
            variation = %record.variation,
            "processing"
        );
        process_file(config, &record, opener, &mut store, &mut report)
            .map_err(|e| e.in_file(path))?;
        report.files_processed += 1;
    }

    if config.mode.aggregated() {
        render_aggregates(config, &store, &mut report)?;
    }

    info!(
        files = report.files_processed,
        plots = report.plots_written.len(),
        skipped = report.skipped.len(),
        "run finished"
    );
    Ok(report)
}

fn process_file<O: ContainerOpener>(
    config: &HiststackConfig,
    record: &FileRecord,
    opener: &O,
    store: &mut AggregationStore,
    report: &mut RunReport,
) -> Result<()> {
    let container = opener.open(&record.path)?;
    let names = container.histogram_names()?;
    info!("histograms in {}: {names:?}", container.describe());

    let aggregate = config.mode.aggregated();
    if aggregate && record.classification == Classification::Unknown {
        info!("{} is neither signal nor background, not aggregated", record.path.display());
        report.files_unclassified.push(record.path.clone());
    }
    let aggregate = aggregate && record.classification != Classification::Unknown;

    for name in &names {
        let Some(series) = extract(&container, name)? else {
            continue;
        };
        if config.mode.single() {
            let path = write_single(config, &record.path, name, &series)?;
            report.plots_written.push(path);
        }
        if aggregate {
            let key = AggregationKey::new(record.variation.clone(), record.classification, name.clone());
            store.merge(key, series)?;
        }
    }
    Ok(())
}

fn write_single(
    config: &HiststackConfig,
    source: &Path,
    name: &str,
    series: &crate::series::HistogramSeries,
) -> Result<PathBuf> {
    let source_label = source.display().to_string();
    let plot = SinglePlot {
        name,
        source: &source_label,
        x_label: resolve_xlabel(name),
        series: series.as_step(),
    };
    let stem = source.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let out = config.output_dir.join(plot.file_name(&stem, config.format.extension()));

    let svg = single::render(&plot, &config.plot)?;
    hs_render::render_to_file(&svg, &out, config.format, &config.plot)?;
    info!("wrote {}", out.display());
    Ok(out)
}

fn render_aggregates(
    config: &HiststackConfig,
    store: &AggregationStore,
    report: &mut RunReport,
) -> Result<()> {
    let (pairs, unpaired) = store.plot_pairs();
    for u in unpaired {
        debug!(
            variation = %u.variation,
            name = %u.name,
            only = %u.present_in,
            "no matching aggregate, plot skipped"
        );
        report.skipped.push((u.variation, u.name));
    }
    if pairs.is_empty() && !store.is_empty() {
        warn!("no histogram has both a signal and a background aggregate");
    }

    for pair in pairs {
        let plot = StackedPlot {
            name: pair.name,
            variation: pair.variation,
            x_label: resolve_xlabel(pair.name),
            signal: vec![pair.signal.as_step()],
            background: vec![pair.background.as_step()],
            stack_mode: config.stack_mode,
        };
        let out = config.output_dir.join(plot.file_name(config.format.extension()));
        let svg = stacked::render(&plot, &config.plot)?;
        hs_render::render_to_file(&svg, &out, config.format, &config.plot)?;
        info!("wrote {} ({} / {})", out.display(), pair.variation, pair.name);
        report.plots_written.push(out);
    }
    Ok(())
}

//! End-to-end runs over ROOT files written to a temp directory.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use hs_core::pipeline;
use hs_core::{ClassificationPolicy, Error, HiststackConfig, Mode};
use hs_render::{OutputFormat, StackMode};
use hs_root::testing::{Compression, FixtureFile};

const EDGES: [f64; 4] = [0.0, 50.0, 100.0, 150.0];

fn tmp_dir(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    p.push(format!("hs-core-it-{}-{}-{}", name, std::process::id(), nanos));
    p
}

fn rm_rf(path: &Path) {
    let _ = std::fs::remove_dir_all(path);
}

struct Workspace {
    root: PathBuf,
}

impl Workspace {
    fn new(name: &str) -> Self {
        let root = tmp_dir(name);
        rm_rf(&root);
        std::fs::create_dir_all(root.join("in")).unwrap();
        Self { root }
    }

    fn write(&self, file: &str, contents: FixtureFile) {
        contents.write_to(self.root.join("in").join(file)).unwrap();
    }

    fn config(&self, mode: Mode) -> HiststackConfig {
        HiststackConfig {
            input_glob: format!("{}/in/*.root", self.root.display()),
            output_dir: self.root.join("out"),
            mode,
            format: OutputFormat::Svg,
            ..Default::default()
        }
    }

    fn out(&self, name: &str) -> PathBuf {
        self.root.join("out").join(name)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        rm_rf(&self.root);
    }
}

#[test]
fn signal_and_background_files_produce_one_figure_per_name() {
    let ws = Workspace::new("basic");
    ws.write(
        "ttbar_lephad.root",
        FixtureFile::new()
            .th1d("jet_pt", &EDGES, &[10.0, 5.0, 1.0])
            .th1d("mass_reco", &EDGES, &[1.0, 2.0, 3.0]),
    );
    ws.write(
        "ttbar_hadhad.root",
        FixtureFile::new().compression(Compression::Zlib).th1f("jet_pt", &EDGES, &[20.0, 8.0, 2.0]),
    );
    ws.write("ttbar_leplep.root", FixtureFile::new().th1d("jet_pt", &EDGES, &[4.0, 4.0, 4.0]));

    let report = pipeline::run(&ws.config(Mode::Aggregated)).unwrap();
    assert_eq!(report.files_processed, 3);
    assert_eq!(report.plots_written, vec![ws.out("jet_pt_SM.svg")]);
    assert!(!ws.out("mass_reco_SM.svg").exists());
    assert_eq!(report.skipped, vec![("SM".to_string(), "mass_reco".to_string())]);

    let svg = std::fs::read_to_string(ws.out("jet_pt_SM.svg")).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Histogram: jet_pt (SM)"));
    assert!(svg.contains("Fully hadronic"));
    assert!(svg.contains("Signal"));
}

#[test]
fn variations_are_plotted_separately() {
    let ws = Workspace::new("variations");
    ws.write("sig_lephad_JESup_v1.root", FixtureFile::new().th1d("lep_eta", &EDGES, &[1.0, 1.0, 1.0]));
    ws.write("bkg_leplep_JESup_v1.root", FixtureFile::new().th1d("lep_eta", &EDGES, &[2.0, 2.0, 2.0]));
    ws.write("sig_lephad_v1.root", FixtureFile::new().th1d("lep_eta", &EDGES, &[1.0, 1.0, 1.0]));
    ws.write("bkg_leplep_v1.root", FixtureFile::new().th1d("lep_eta", &EDGES, &[2.0, 2.0, 2.0]));

    let report = pipeline::run(&ws.config(Mode::Aggregated)).unwrap();
    assert_eq!(report.plots_written, vec![ws.out("lep_eta_JESup.svg"), ws.out("lep_eta_SM.svg")]);
}

#[test]
fn single_mode_names_figures_after_the_input_file() {
    let ws = Workspace::new("single");
    ws.write(
        "data_run2.root",
        FixtureFile::new()
            .th1d("met_energy", &EDGES, &[3.0, 2.0, 1.0])
            .directory("jets", FixtureFile::new().th1d("jet_phi", &[-3.0, 0.0, 3.0], &[5.0, 5.0])),
    );

    let report = pipeline::run(&ws.config(Mode::Single)).unwrap();
    assert_eq!(report.plots_written, vec![
        ws.out("data_run2_met_energy.svg"),
        ws.out("data_run2_jets_jet_phi.svg"),
    ]);
    let svg = std::fs::read_to_string(ws.out("data_run2_met_energy.svg")).unwrap();
    assert!(svg.contains("Energy [GeV]"));
}

#[test]
fn incompatible_binning_names_file_and_histogram() {
    let ws = Workspace::new("mismatch");
    ws.write("a_lephad.root", FixtureFile::new().th1d("jet_pt", &EDGES, &[1.0, 1.0, 1.0]));
    ws.write("b_lephad.root", FixtureFile::new().th1d("jet_pt", &[0.0, 75.0, 150.0], &[1.0, 1.0]));

    let err = pipeline::run(&ws.config(Mode::Aggregated)).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("b_lephad.root"), "{msg}");
    assert!(msg.contains("jet_pt"), "{msg}");
    match err {
        Error::InFile { source, .. } => {
            assert!(matches!(*source, Error::IncompatibleBinLayout { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn strict_policy_leaves_unlabelled_files_out() {
    let ws = Workspace::new("strict");
    ws.write("data_2018.root", FixtureFile::new().th1d("h", &EDGES, &[1.0, 1.0, 1.0]));
    ws.write("z_hadhad.root", FixtureFile::new().th1d("h", &EDGES, &[1.0, 1.0, 1.0]));

    let mut cfg = ws.config(Mode::Aggregated);
    cfg.classification_policy = ClassificationPolicy::Strict;
    let report = pipeline::run(&cfg).unwrap();
    assert_eq!(report.files_unclassified.len(), 1);
    assert!(report.plots_written.is_empty());

    cfg.classification_policy = ClassificationPolicy::Legacy;
    let report = pipeline::run(&cfg).unwrap();
    assert!(report.files_unclassified.is_empty());
    assert_eq!(report.plots_written, vec![ws.out("h_SM.svg")]);
}

#[test]
fn one_background_aggregate_stacks_the_same_either_way() {
    let ws = Workspace::new("stack");
    ws.write("s_lephad.root", FixtureFile::new().th1d("m", &EDGES, &[1.0, 2.0, 1.0]));
    ws.write("b_leplep.root", FixtureFile::new().th1d("m", &EDGES, &[3.0, 3.0, 3.0]));

    let mut cfg = ws.config(Mode::Aggregated);
    pipeline::run(&cfg).unwrap();
    let overlay = std::fs::read_to_string(ws.out("m_SM.svg")).unwrap();

    cfg.stack_mode = StackMode::Cumulative;
    pipeline::run(&cfg).unwrap();
    let cumulative = std::fs::read_to_string(ws.out("m_SM.svg")).unwrap();
    assert_eq!(overlay, cumulative);
}

#[test]
fn empty_glob_is_not_an_error() {
    let ws = Workspace::new("empty");
    let report = pipeline::run(&ws.config(Mode::Aggregated)).unwrap();
    assert_eq!(report.files_processed, 0);
    assert!(report.plots_written.is_empty());
    assert!(ws.root.join("out").is_dir());
}

//! Integration tests: read TH1 histograms from synthesised ROOT files.

use approx::assert_relative_eq;
use hs_root::testing::{Compression, FixtureFile};
use hs_root::{RootError, RootFile};

fn open(fixture: FixtureFile) -> RootFile {
    RootFile::from_bytes(fixture.build(), "fixture.root").expect("fixture should parse")
}

#[test]
fn uniform_th1d_edges_are_reconstructed() {
    let f = open(FixtureFile::new().th1d("jet_pt", &[0.0, 25.0, 50.0, 75.0, 100.0], &[
        4.0, 10.0, 6.5, 1.0,
    ]));

    let h = f.get_histogram("jet_pt").unwrap();
    assert_eq!(h.name, "jet_pt");
    assert_eq!(h.class_name, "TH1D");
    assert_eq!(h.n_bins(), 4);
    assert_eq!(h.bin_content, vec![4.0, 10.0, 6.5, 1.0]);
    for (got, want) in h.bin_edges.iter().zip([0.0, 25.0, 50.0, 75.0, 100.0]) {
        assert_relative_eq!(*got, want, epsilon = 1e-12);
    }
}

#[test]
fn variable_edges_are_read_from_xbins() {
    let edges = [0.0, 1.0, 5.0, 20.0];
    let f = open(FixtureFile::new().th1d("m_reco", &edges, &[1.0, 2.0, 3.0]));
    let h = f.get_histogram("m_reco").unwrap();
    assert_eq!(h.bin_edges, edges.to_vec());
}

#[test]
fn integer_and_float_classes_widen_to_f64() {
    let edges = [0.0, 1.0, 2.0];
    let f = open(
        FixtureFile::new()
            .th1f("f", &edges, &[1.5, 2.5])
            .histogram("TH1I", "i", &edges, &[7.0, 9.0])
            .histogram("TH1S", "s", &edges, &[-2.0, 3.0])
            .histogram("TH1C", "c", &edges, &[5.0, 0.0]),
    );
    assert_eq!(f.get_histogram("f").unwrap().bin_content, vec![1.5, 2.5]);
    assert_eq!(f.get_histogram("i").unwrap().bin_content, vec![7.0, 9.0]);
    assert_eq!(f.get_histogram("s").unwrap().bin_content, vec![-2.0, 3.0]);
    assert_eq!(f.get_histogram("c").unwrap().bin_content, vec![5.0, 0.0]);
}

#[test]
fn zlib_compressed_payloads_are_inflated() {
    let f = open(
        FixtureFile::new()
            .compression(Compression::Zlib)
            .th1d("lep_eta", &[-2.5, 0.0, 2.5], &[11.0, 13.0]),
    );
    let h = f.get_histogram("lep_eta").unwrap();
    assert_eq!(h.bin_content, vec![11.0, 13.0]);
}

#[test]
fn keys_are_listed_with_class_names() {
    let f = open(
        FixtureFile::new()
            .th1d("a", &[0.0, 1.0], &[1.0])
            .th1f("b", &[0.0, 1.0], &[2.0])
            .object("events", "TTree", vec![0u8; 8]),
    );
    let keys = f.list_keys().unwrap();
    let listed: Vec<(&str, &str)> =
        keys.iter().map(|k| (k.name.as_str(), k.class_name.as_str())).collect();
    assert_eq!(listed, vec![("a", "TH1D"), ("b", "TH1F"), ("events", "TTree")]);
}

#[test]
fn nested_directories_are_walked_and_addressable() {
    let inner = FixtureFile::new().th1d("h_phi", &[-3.0, 0.0, 3.0], &[2.0, 3.0]);
    let f = open(FixtureFile::new().th1d("top", &[0.0, 1.0], &[1.0]).directory("jets", inner));

    let names: Vec<String> = f.walk_keys().unwrap().into_iter().map(|k| k.name).collect();
    assert_eq!(names, vec!["top", "jets", "jets/h_phi"]);

    assert!(f.contains("jets/h_phi").unwrap());
    assert!(!f.contains("jets/h_missing").unwrap());
    assert_eq!(f.get_histogram("jets/h_phi").unwrap().bin_content, vec![2.0, 3.0]);
}

#[test]
fn missing_key_reports_key_not_found() {
    let f = open(FixtureFile::new().th1d("a", &[0.0, 1.0], &[1.0]));
    assert!(!f.contains("b").unwrap());
    assert!(matches!(f.get_histogram("b"), Err(RootError::KeyNotFound(_))));
}

#[test]
fn unsupported_class_is_rejected() {
    let f = open(FixtureFile::new().object("h2", "TH2D", vec![0u8; 16]));
    assert_eq!(f.class_of("h2").unwrap(), "TH2D");
    assert!(matches!(f.get_histogram("h2"), Err(RootError::UnsupportedClass(c)) if c == "TH2D"));
}

#[test]
fn open_from_disk_matches_in_memory() {
    let path = std::env::temp_dir()
        .join(format!("hs-root-open-{}-{}.root", std::process::id(), line!()));
    FixtureFile::new().th1d("h", &[0.0, 2.0, 4.0], &[1.0, 2.0]).write_to(&path).unwrap();

    let f = RootFile::open(&path).unwrap();
    assert_eq!(f.path(), path.as_path());
    assert_eq!(f.get_histogram("h").unwrap().bin_content, vec![1.0, 2.0]);

    drop(f);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn highest_cycle_wins_in_listing_and_reads() {
    // newest cycle written first, as ROOT does after an overwrite
    let f = open(
        FixtureFile::new()
            .th1d("jet_pt", &[0.0, 1.0, 2.0], &[5.0, 6.0])
            .cycle(3)
            .th1d("jet_pt", &[0.0, 1.0, 2.0], &[1.0, 2.0])
            .cycle(2)
            .th1d("mass_reco", &[0.0, 1.0], &[7.0]),
    );
    let keys = f.walk_keys().unwrap();
    let listed: Vec<(&str, u16)> = keys.iter().map(|k| (k.name.as_str(), k.cycle)).collect();
    assert_eq!(listed, vec![("jet_pt", 3), ("mass_reco", 1)]);
    assert_eq!(f.get_histogram("jet_pt").unwrap().bin_content, vec![5.0, 6.0]);
}

#[test]
fn later_written_higher_cycle_replaces_the_first() {
    let inner = FixtureFile::new()
        .th1d("h_eta", &[-2.5, 0.0, 2.5], &[1.0, 1.0])
        .th1d("h_eta", &[-2.5, 0.0, 2.5], &[4.0, 8.0])
        .cycle(2);
    let f = open(FixtureFile::new().directory("lep", inner));

    let keys = f.walk_keys().unwrap();
    assert_eq!(keys.len(), 2);
    assert_eq!((keys[1].name.as_str(), keys[1].cycle), ("lep/h_eta", 2));
    assert_eq!(f.list_keys().unwrap().len(), 1);
    assert_eq!(f.get_histogram("lep/h_eta").unwrap().bin_content, vec![4.0, 8.0]);
}

#[test]
fn large_seek_layout_is_read() {
    let inner = FixtureFile::new().th1f("h_phi", &[-3.0, 0.0, 3.0], &[2.0, 3.0]);
    let f = open(
        FixtureFile::new()
            .large_seeks(true)
            .compression(Compression::Zlib)
            .th1d("jet_pt", &[0.0, 50.0, 100.0], &[10.0, 4.0])
            .th1d("jet_pt", &[0.0, 50.0, 100.0], &[12.0, 5.0])
            .cycle(2)
            .directory("jets", inner),
    );

    let names: Vec<String> = f.walk_keys().unwrap().into_iter().map(|k| k.name).collect();
    assert_eq!(names, vec!["jet_pt", "jets", "jets/h_phi"]);

    let h = f.get_histogram("jet_pt").unwrap();
    assert_eq!(h.bin_edges, vec![0.0, 50.0, 100.0]);
    assert_relative_eq!(h.bin_content[0], 12.0);
    assert_relative_eq!(h.bin_content[1], 5.0);
    assert_eq!(f.get_histogram("jets/h_phi").unwrap().bin_content, vec![2.0, 3.0]);
}

//! # hs-root
//!
//! Native ROOT file reader for histstack.
//!
//! Lists keys and reads 1D histograms (`TH1D`, `TH1F`, `TH1I`, `TH1S`, `TH1C`)
//! from `.root` files without a ROOT installation. Object payloads may be raw or
//! zlib, LZ4, ZSTD or XZ compressed.
//!
//! ## Example
//!
//! ```no_run
//! use hs_root::RootFile;
//!
//! let f = RootFile::open("ttbar_lephad.root").unwrap();
//! for key in f.walk_keys().unwrap() {
//!     println!("{} ({})", key.name, key.class_name);
//! }
//! let h = f.get_histogram("jet_pt").unwrap();
//! println!("{} bins, {} entries", h.n_bins(), h.entries);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decompress;
pub mod directory;
pub mod error;
pub mod file;
pub mod histogram;
pub mod key;
pub mod objects;
pub mod rbuffer;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use error::{Result, RootError};
pub use file::RootFile;
pub use histogram::Histogram;
pub use key::KeyInfo;
pub use objects::is_supported_histogram;

//! Minimal ROOT file writer for tests.
//!
//! Produces files with just enough structure for [`RootFile`](crate::RootFile):
//! a header, a top directory, optional subdirectories, and TH1 objects stored
//! either raw or as zlib blocks. Keys can carry explicit cycles, and the whole
//! file can be written with the 64-bit seek layout ROOT uses past 2 GB.

use std::io::Write;
use std::path::Path;

const FILE_VERSION: u32 = 62206;
const LARGE_FILE_OFFSET: u32 = 1_000_000;
const LARGE_RECORD_OFFSET: u16 = 1000;
const BEGIN: u32 = 100;
const NBYTES_NAME: u32 = 32;
const DATA_START: usize = 256;
const KEY_VERSION: u16 = 4;
const DIR_VERSION: u16 = 5;

/// How object payloads are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Raw payload behind the key header.
    #[default]
    None,
    /// One `ZL` block per object.
    Zlib,
}

#[derive(Debug, Clone)]
enum Entry {
    Object { name: String, class: String, payload: Vec<u8>, cycle: u16 },
    Directory { name: String, contents: FixtureFile },
}

/// Builder for an in-memory ROOT file.
#[derive(Debug, Clone, Default)]
pub struct FixtureFile {
    entries: Vec<Entry>,
    compression: Compression,
    large: bool,
}

impl FixtureFile {
    /// Empty file, uncompressed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store payloads with the given compression.
    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Write the header, keys and directories with 64-bit seek fields.
    ///
    /// Only meaningful on the top-level file; subdirectories follow it.
    pub fn large_seeks(mut self, large: bool) -> Self {
        self.large = large;
        self
    }

    /// Set the cycle of the most recently added object (default 1).
    pub fn cycle(mut self, cycle: u16) -> Self {
        match self.entries.last_mut() {
            Some(Entry::Object { cycle: c, .. }) => *c = cycle,
            _ => panic!("cycle() must follow an object"),
        }
        self
    }

    /// Add a `TH1D`.
    pub fn th1d(self, name: &str, edges: &[f64], contents: &[f64]) -> Self {
        self.histogram("TH1D", name, edges, contents)
    }

    /// Add a `TH1F`.
    pub fn th1f(self, name: &str, edges: &[f64], contents: &[f64]) -> Self {
        self.histogram("TH1F", name, edges, contents)
    }

    /// Add a 1D histogram of class `class` (`TH1D`, `TH1F`, `TH1I`, `TH1S`, `TH1C`).
    ///
    /// Equally spaced edges are stored as (nbins, xmin, xmax); anything else as `fXbins`.
    pub fn histogram(mut self, class: &str, name: &str, edges: &[f64], contents: &[f64]) -> Self {
        assert_eq!(edges.len(), contents.len() + 1, "edges must be one longer than contents");
        let payload = th1_payload(class, name, edges, contents);
        self.entries.push(Entry::Object { name: name.into(), class: class.into(), payload, cycle: 1 });
        self
    }

    /// Add an arbitrary object with a hand-built payload (e.g. a `TTree` placeholder).
    pub fn object(mut self, name: &str, class: &str, payload: Vec<u8>) -> Self {
        self.entries.push(Entry::Object { name: name.into(), class: class.into(), payload, cycle: 1 });
        self
    }

    /// Add a `TDirectoryFile` holding `contents`.
    pub fn directory(mut self, name: &str, contents: FixtureFile) -> Self {
        self.entries.push(Entry::Directory { name: name.into(), contents });
        self
    }

    /// Serialize the file.
    pub fn build(&self) -> Vec<u8> {
        let large = self.large;
        let mut out = vec![0u8; DATA_START];
        let top_keys = write_directory(&mut out, self, "", 0, large);

        let mut header = WBuffer::default();
        header.bytes(b"root");
        header.u32(if large { FILE_VERSION + LARGE_FILE_OFFSET } else { FILE_VERSION });
        header.u32(BEGIN);
        header.seek(out.len() as u64, large); // fEND
        header.seek(0, large); // fSeekFree
        header.u32(0); // fNbytesFree
        header.u32(0); // nfree
        header.u32(NBYTES_NAME);
        header.u8(if large { 8 } else { 4 }); // fUnits
        header.u32(if self.compression == Compression::Zlib { 101 } else { 0 });
        header.seek(0, large); // fSeekInfo
        header.u32(0); // fNbytesInfo
        header.bytes(&[0u8; 18]);
        out[..header.0.len()].copy_from_slice(&header.0);

        let dir = dir_streamer(top_keys.0, top_keys.1, large);
        let at = (BEGIN + NBYTES_NAME) as usize;
        out[at..at + dir.len()].copy_from_slice(&dir);
        out
    }

    /// Serialize and write to `path`.
    pub fn write_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, self.build())
    }
}

/// Seek-field width and cycle for one key.
#[derive(Clone, Copy)]
struct KeyLayout {
    cycle: u16,
    large: bool,
}

/// Write every entry of `dir`, then its key list. Returns `(seek_keys, nbytes_keys)`.
fn write_directory(
    out: &mut Vec<u8>,
    dir: &FixtureFile,
    name: &str,
    parent: u64,
    large: bool,
) -> (u64, u32) {
    let mut headers = Vec::new();
    for entry in &dir.entries {
        let header = match entry {
            Entry::Object { name, class, payload, cycle } => {
                let layout = KeyLayout { cycle: *cycle, large };
                write_key(out, class, name, payload, dir.compression, parent, layout)
            }
            Entry::Directory { name, contents } => {
                let (seek_keys, nbytes_keys) = write_directory(out, contents, name, parent, large);
                let streamer = dir_streamer(seek_keys, nbytes_keys, large);
                let layout = KeyLayout { cycle: 1, large };
                write_key(out, "TDirectoryFile", name, &streamer, Compression::None, parent, layout)
            }
        };
        headers.push(header);
    }

    let mut body = WBuffer::default();
    body.u32(headers.len() as u32);
    for h in &headers {
        body.bytes(h);
    }
    let seek = out.len() as u64;
    let layout = KeyLayout { cycle: 1, large };
    let list_header = key_header("TDirectory", name, body.0.len(), body.0.len(), seek, parent, layout);
    let nbytes = (list_header.len() + body.0.len()) as u32;
    out.extend_from_slice(&list_header);
    out.extend_from_slice(&body.0);
    (seek, nbytes)
}

/// Append a key plus payload; returns the key header bytes for the directory listing.
fn write_key(
    out: &mut Vec<u8>,
    class: &str,
    name: &str,
    payload: &[u8],
    compression: Compression,
    parent: u64,
    layout: KeyLayout,
) -> Vec<u8> {
    let stored = match compression {
        Compression::None => payload.to_vec(),
        Compression::Zlib => zlib_block(payload),
    };
    let seek = out.len() as u64;
    let header = key_header(class, name, stored.len(), payload.len(), seek, parent, layout);
    out.extend_from_slice(&header);
    out.extend_from_slice(&stored);
    header
}

fn key_header(
    class: &str,
    name: &str,
    stored_len: usize,
    obj_len: usize,
    seek: u64,
    parent: u64,
    layout: KeyLayout,
) -> Vec<u8> {
    let fixed = if layout.large { 34 } else { 26 };
    let key_len = fixed + [class, name, ""].iter().map(|s| 1 + s.len()).sum::<usize>();
    let mut w = WBuffer::default();
    w.u32((key_len + stored_len) as u32);
    w.u16(if layout.large { KEY_VERSION + LARGE_RECORD_OFFSET } else { KEY_VERSION });
    w.u32(obj_len as u32);
    w.u32(0); // datime
    w.u16(key_len as u16);
    w.u16(layout.cycle);
    w.seek(seek, layout.large);
    w.seek(parent, layout.large);
    w.string(class);
    w.string(name);
    w.string("");
    w.0
}

fn dir_streamer(seek_keys: u64, nbytes_keys: u32, large: bool) -> Vec<u8> {
    let mut w = WBuffer::default();
    w.u16(if large { DIR_VERSION + LARGE_RECORD_OFFSET } else { DIR_VERSION });
    w.u32(0); // fDatimeC
    w.u32(0); // fDatimeM
    w.u32(nbytes_keys);
    w.u32(0); // fNbytesName
    w.seek(0, large); // fSeekDir
    w.seek(0, large); // fSeekParent
    w.seek(seek_keys, large);
    w.0
}

fn zlib_block(payload: &[u8]) -> Vec<u8> {
    let mut enc = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    enc.write_all(payload).expect("writing to a Vec cannot fail");
    let compressed = enc.finish().expect("writing to a Vec cannot fail");

    let mut w = WBuffer::default();
    w.bytes(b"ZL");
    w.u8(8);
    w.bytes(&(compressed.len() as u32).to_le_bytes()[..3]);
    w.bytes(&(payload.len() as u32).to_le_bytes()[..3]);
    w.bytes(&compressed);
    w.0
}

fn th1_payload(class: &str, name: &str, edges: &[f64], contents: &[f64]) -> Vec<u8> {
    let n_bins = contents.len();
    let n_cells = n_bins + 2;
    let (x_min, x_max) = (edges[0], edges[n_bins]);
    let width = (x_max - x_min) / n_bins as f64;
    let uniform =
        edges.iter().enumerate().all(|(i, e)| (e - (x_min + i as f64 * width)).abs() < 1e-12);

    let mut th1 = WBuffer::default();
    th1.tnamed(name, name);
    th1.versioned(2, |w| w.i16s(&[1, 1, 1])); // TAttLine
    th1.versioned(2, |w| w.i16s(&[0, 1001])); // TAttFill
    th1.versioned(2, |w| {
        w.i16s(&[1, 1]);
        w.f32(1.0);
    }); // TAttMarker
    th1.i32(n_cells as i32);
    th1.taxis("xaxis", n_bins, x_min, x_max, if uniform { &[] } else { edges });
    th1.taxis("yaxis", 1, 0.0, 1.0, &[]);
    th1.taxis("zaxis", 1, 0.0, 1.0, &[]);
    th1.i16s(&[0, 1000]); // fBarOffset, fBarWidth
    let total: f64 = contents.iter().sum();
    for v in [total, total, total, 0.0, 0.0, -1111.0, -1111.0, 0.0] {
        // fEntries, fTsumw, fTsumw2, fTsumwx, fTsumwx2, fMaximum, fMinimum, fNormFactor
        th1.f64(v);
    }
    th1.u32(0); // fContour
    th1.u32(0); // fSumw2
    th1.string(""); // fOption
    th1.u32(0); // fFunctions (null)
    th1.i32(0); // fBufferSize
    th1.u8(0); // fBuffer
    th1.i32(0); // fBinStatErrOpt
    th1.i32(2); // fStatOverflows

    let mut top = WBuffer::default();
    top.versioned(3, |w| {
        w.versioned(8, |w| w.bytes(&th1.0));
        w.u32(n_cells as u32);
        let cells = std::iter::once(0.0).chain(contents.iter().copied()).chain([0.0]);
        for v in cells {
            match class {
                "TH1D" => w.f64(v),
                "TH1F" => w.f32(v as f32),
                "TH1I" => w.i32(v as i32),
                "TH1S" => w.i16s(&[v as i16]),
                "TH1C" => w.u8(v as i8 as u8),
                other => panic!("fixture writer does not support {other}"),
            }
        }
    });
    top.0
}

#[derive(Default)]
struct WBuffer(Vec<u8>);

impl WBuffer {
    fn bytes(&mut self, b: &[u8]) {
        self.0.extend_from_slice(b);
    }
    fn u8(&mut self, v: u8) {
        self.0.push(v);
    }
    fn u16(&mut self, v: u16) {
        self.bytes(&v.to_be_bytes());
    }
    fn u32(&mut self, v: u32) {
        self.bytes(&v.to_be_bytes());
    }
    /// Seek pointer: u64 in the large layout, u32 otherwise.
    fn seek(&mut self, v: u64, large: bool) {
        if large {
            self.bytes(&v.to_be_bytes());
        } else {
            self.u32(v as u32);
        }
    }
    fn i32(&mut self, v: i32) {
        self.bytes(&v.to_be_bytes());
    }
    fn i16s(&mut self, vs: &[i16]) {
        for v in vs {
            self.bytes(&v.to_be_bytes());
        }
    }
    fn f32(&mut self, v: f32) {
        self.bytes(&v.to_be_bytes());
    }
    fn f64(&mut self, v: f64) {
        self.bytes(&v.to_be_bytes());
    }
    fn string(&mut self, s: &str) {
        assert!(s.len() < 255, "fixture strings are short");
        self.u8(s.len() as u8);
        self.bytes(s.as_bytes());
    }

    /// Version header with byte count, then `body`.
    fn versioned(&mut self, version: u16, body: impl FnOnce(&mut WBuffer)) {
        let mut inner = WBuffer::default();
        body(&mut inner);
        self.u32((inner.0.len() as u32 + 2) | 0x4000_0000);
        self.u16(version);
        self.bytes(&inner.0);
    }

    fn tnamed(&mut self, name: &str, title: &str) {
        self.versioned(1, |w| {
            w.u16(1); // TObject version
            w.u32(0); // fUniqueID
            w.u32(0x0300_0000); // fBits
            w.string(name);
            w.string(title);
        });
    }

    fn taxis(&mut self, name: &str, n_bins: usize, x_min: f64, x_max: f64, edges: &[f64]) {
        self.versioned(10, |w| {
            w.tnamed(name, "");
            w.versioned(4, |w| {
                w.i32(510); // fNdivisions
                w.i16s(&[1, 1]);
                w.f32s(&[0.005, 0.035, 0.005, 1.0, 0.0]);
            }); // TAttAxis
            w.i32(n_bins as i32);
            w.f64(x_min);
            w.f64(x_max);
            w.u32(edges.len() as u32);
            for &e in edges {
                w.f64(e);
            }
            w.i32(0); // fFirst
            w.i32(0); // fLast
            w.u16(0); // fBits2
            w.u8(0); // fTimeDisplay
            w.string(""); // fTimeFormat
            w.u32(0); // fLabels
            w.u32(0); // fModLabs
        });
    }

    fn f32s(&mut self, vs: &[f32]) {
        for &v in vs {
            self.f32(v);
        }
    }
}

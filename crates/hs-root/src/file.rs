//! TFile header parsing and the top-level [`RootFile`] interface.

use std::fs;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use crate::decompress::decompress;
use crate::directory::{DirHeader, Directory};
use crate::error::{Result, RootError};
use crate::histogram::Histogram;
use crate::key::{Key, KeyInfo, is_directory_class};
use crate::objects;
use crate::rbuffer::RBuffer;

const ROOT_MAGIC: &[u8; 4] = b"root";

/// Smallest byte count that can hold a file header.
const MIN_FILE_LEN: usize = 64;

/// File versions at or above this use 64-bit seek pointers.
const LARGE_FILE_VERSION: u32 = 1_000_000;

/// Backing bytes of an open file.
enum DataSource {
    Owned(Vec<u8>),
    Mmap(memmap2::Mmap),
}

impl Deref for DataSource {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            DataSource::Owned(v) => v,
            DataSource::Mmap(m) => m,
        }
    }
}

/// A ROOT file opened for reading histograms.
pub struct RootFile {
    data: DataSource,
    path: PathBuf,
    is_large: bool,
    top: DirHeader,
}

impl RootFile {
    /// Open a ROOT file from disk (memory-mapped).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = fs::File::open(&path)?;
        // SAFETY: the mapping is only read; concurrent truncation by another
        // process is outside what this batch reader guards against.
        let mmap = unsafe { memmap2::Mmap::map(&file)? };
        Self::from_source(DataSource::Mmap(mmap), path)
    }

    /// Parse a ROOT file held in memory. `path` is only used for diagnostics.
    pub fn from_bytes(data: Vec<u8>, path: impl Into<PathBuf>) -> Result<Self> {
        Self::from_source(DataSource::Owned(data), path.into())
    }

    fn from_source(data: DataSource, path: PathBuf) -> Result<Self> {
        if data.len() < MIN_FILE_LEN || &data[0..4] != ROOT_MAGIC {
            return Err(RootError::BadMagic);
        }
        let (is_large, top) = parse_header(&data)?;
        Ok(Self { data, path, is_large, top })
    }

    /// Path this file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keys of the top-level directory (latest cycle of each name).
    pub fn list_keys(&self) -> Result<Vec<KeyInfo>> {
        let dir = self.top_directory()?;
        Ok(dir.latest_keys().into_iter().map(|k| KeyInfo::from_key(k, "")).collect())
    }

    /// Every key in the file, descending into subdirectories.
    ///
    /// Nested entries are named `dir/name`; directories themselves are listed too.
    pub fn walk_keys(&self) -> Result<Vec<KeyInfo>> {
        let mut out = Vec::new();
        self.walk_dir(&self.top_directory()?, "", &mut out)?;
        Ok(out)
    }

    fn walk_dir(&self, dir: &Directory, prefix: &str, out: &mut Vec<KeyInfo>) -> Result<()> {
        for key in dir.latest_keys() {
            let info = KeyInfo::from_key(key, prefix);
            if info.is_directory() {
                let sub = self.read_subdirectory(key)?;
                let nested = info.name.clone();
                out.push(info);
                self.walk_dir(&sub, &nested, out)?;
            } else {
                out.push(info);
            }
        }
        Ok(())
    }

    /// Whether an object exists at `path` (`name` or `dir/name`).
    pub fn contains(&self, path: &str) -> Result<bool> {
        match self.find(path) {
            Ok(_) => Ok(true),
            Err(RootError::KeyNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Class name of the object at `path`.
    pub fn class_of(&self, path: &str) -> Result<String> {
        Ok(self.find(path)?.class_name)
    }

    /// Read the 1D histogram stored at `path`.
    pub fn get_histogram(&self, path: &str) -> Result<Histogram> {
        let key = self.find(path)?;
        let payload = self.read_key_payload(&key)?;
        objects::read_histogram(&payload, &key.class_name)
    }

    fn find(&self, path: &str) -> Result<Key> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((leaf, dirs)) = parts.split_last() else {
            return Err(RootError::KeyNotFound(path.to_string()));
        };

        let mut dir = self.top_directory()?;
        for &part in dirs {
            let key = dir
                .find_key(part)
                .ok_or_else(|| RootError::KeyNotFound(format!("{part} (in path {path})")))?;
            if !is_directory_class(&key.class_name) {
                return Err(RootError::KeyNotFound(format!(
                    "{part} is a {} not a directory (in path {path})",
                    key.class_name
                )));
            }
            dir = self.read_subdirectory(key)?;
        }

        dir.find_key(leaf).cloned().ok_or_else(|| RootError::KeyNotFound(path.to_string()))
    }

    fn top_directory(&self) -> Result<Directory> {
        Directory::read(&self.data, self.top, self.is_large)
    }

    fn read_subdirectory(&self, key: &Key) -> Result<Directory> {
        let payload = self.read_key_payload(key)?;
        let header = DirHeader::read(&mut RBuffer::new(&payload))?;
        Directory::read(&self.data, header, self.is_large)
    }

    /// Read and, when needed, decompress the object stored behind `key`.
    fn read_key_payload(&self, key: &Key) -> Result<Vec<u8>> {
        let start = usize::try_from(key.seek_key).map_err(|_| {
            RootError::Deserialization(format!("seek offset too large: {}", key.seek_key))
        })?;
        let end = start + key.n_bytes as usize;
        if end > self.data.len() || (key.key_len as usize) > key.n_bytes as usize {
            return Err(RootError::BufferUnderflow {
                offset: start,
                need: key.n_bytes as usize,
                have: self.data.len().saturating_sub(start),
            });
        }

        let object = &self.data[start + key.key_len as usize..end];
        if key.is_compressed() {
            decompress(object, key.obj_len as usize)
        } else {
            Ok(object.to_vec())
        }
    }
}

/// Parse the file header and the top directory streamer it points at.
///
/// Small-file header layout (large files widen fEND, fSeekFree, fSeekInfo to u64):
/// ```text
/// offset  size  field
///    0      4   magic "root"
///    4      4   fVersion
///    8      4   fBEGIN
///   12      4   fEND
///   16      4   fSeekFree
///   20      4   fNbytesFree
///   24      4   nfree
///   28      4   fNbytesName
///   32      1   fUnits
///   33      4   fCompress
///   37      4   fSeekInfo
///   41      4   fNbytesInfo
///   45     18   fUUID
/// ```
/// The top TDirectory streamer sits at `fBEGIN + fNbytesName`.
fn parse_header(data: &[u8]) -> Result<(bool, DirHeader)> {
    let mut r = RBuffer::at(data, ROOT_MAGIC.len());
    let version = r.read_u32()?;
    let is_large = version >= LARGE_FILE_VERSION;
    let begin = r.read_u32()? as usize;
    if is_large {
        r.skip(16)?; // fEND, fSeekFree
    } else {
        r.skip(8)?;
    }
    let _nbytes_free = r.read_u32()?;
    let _nfree = r.read_u32()?;
    let nbytes_name = r.read_u32()? as usize;

    let dir_offset = begin + nbytes_name;
    if dir_offset >= data.len() {
        return Err(RootError::Deserialization("top directory offset past end of file".into()));
    }
    let top = DirHeader::read(&mut RBuffer::at(data, dir_offset))?;
    Ok((is_large, top))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_non_root_bytes() {
        let result = RootFile::from_bytes(vec![0u8; 100], "zeros.root");
        assert!(matches!(result, Err(RootError::BadMagic)));
    }

    #[test]
    fn reject_truncated_header() {
        let result = RootFile::from_bytes(b"root".to_vec(), "short.root");
        assert!(matches!(result, Err(RootError::BadMagic)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = RootFile::open("/nonexistent/histstack/input.root");
        assert!(matches!(result, Err(RootError::Io(_))));
    }
}

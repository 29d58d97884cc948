//! TKey records: the per-object header ROOT uses to locate payloads.

use crate::error::Result;
use crate::rbuffer::RBuffer;

/// Key versions above this use 64-bit seek pointers.
const LARGE_KEY_VERSION: u16 = 1000;

/// A parsed TKey header.
#[derive(Debug, Clone)]
pub struct Key {
    /// Size of key header plus (possibly compressed) object.
    pub n_bytes: u32,
    /// Uncompressed object length.
    pub obj_len: u32,
    /// Size of the key header itself.
    pub key_len: u16,
    /// Cycle number within the owning directory.
    pub cycle: u16,
    /// Absolute file position of this key.
    pub seek_key: u64,
    /// Class of the stored object (e.g. `TH1D`, `TDirectoryFile`).
    pub class_name: String,
    /// Object name.
    pub name: String,
    /// Object title.
    pub title: String,
}

/// Public view of a directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    /// Object name, or `dir/name` path for nested entries.
    pub name: String,
    /// Class name of the stored object.
    pub class_name: String,
    /// Cycle number.
    pub cycle: u16,
}

impl KeyInfo {
    pub(crate) fn from_key(key: &Key, prefix: &str) -> Self {
        let name =
            if prefix.is_empty() { key.name.clone() } else { format!("{prefix}/{}", key.name) };
        Self { name, class_name: key.class_name.clone(), cycle: key.cycle }
    }

    /// Whether this entry is a (sub)directory.
    pub fn is_directory(&self) -> bool {
        is_directory_class(&self.class_name)
    }
}

pub(crate) fn is_directory_class(class_name: &str) -> bool {
    matches!(class_name, "TDirectory" | "TDirectoryFile")
}

impl Key {
    /// Read a TKey header at the cursor.
    pub fn read(r: &mut RBuffer, file_is_large: bool) -> Result<Self> {
        let n_bytes = r.read_u32()?;
        let version = r.read_u16()?;
        let obj_len = r.read_u32()?;
        let _datime = r.read_u32()?;
        let key_len = r.read_u16()?;
        let cycle = r.read_u16()?;

        let seek_key = if version > LARGE_KEY_VERSION || file_is_large {
            let seek_key = r.read_u64()?;
            let _seek_pdir = r.read_u64()?;
            seek_key
        } else {
            let seek_key = r.read_u32()? as u64;
            let _seek_pdir = r.read_u32()?;
            seek_key
        };

        let class_name = r.read_string()?;
        let name = r.read_string()?;
        let title = r.read_string()?;

        Ok(Key { n_bytes, obj_len, key_len, cycle, seek_key, class_name, name, title })
    }

    /// Whether the payload after the header is stored compressed.
    pub fn is_compressed(&self) -> bool {
        self.obj_len as usize != (self.n_bytes as usize).saturating_sub(self.key_len as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_small_key(name: &str, class: &str) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&120u32.to_be_bytes());
        out.extend_from_slice(&4u16.to_be_bytes());
        out.extend_from_slice(&200u32.to_be_bytes());
        out.extend_from_slice(&0u32.to_be_bytes());
        out.extend_from_slice(&60u16.to_be_bytes());
        out.extend_from_slice(&3u16.to_be_bytes());
        out.extend_from_slice(&512u32.to_be_bytes());
        out.extend_from_slice(&100u32.to_be_bytes());
        for s in [class, name, ""] {
            out.push(s.len() as u8);
            out.extend_from_slice(s.as_bytes());
        }
        out
    }

    #[test]
    fn small_key_fields() {
        let raw = encode_small_key("h_pt", "TH1F");
        let key = Key::read(&mut RBuffer::new(&raw), false).unwrap();
        assert_eq!(key.name, "h_pt");
        assert_eq!(key.class_name, "TH1F");
        assert_eq!(key.cycle, 3);
        assert_eq!(key.seek_key, 512);
        assert!(key.is_compressed());
    }

    #[test]
    fn key_info_prefixes_nested_names() {
        let raw = encode_small_key("h_eta", "TH1D");
        let key = Key::read(&mut RBuffer::new(&raw), false).unwrap();
        assert_eq!(KeyInfo::from_key(&key, "").name, "h_eta");
        assert_eq!(KeyInfo::from_key(&key, "jets").name, "jets/h_eta");
    }
}

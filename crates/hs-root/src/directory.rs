//! TDirectory streamers and key lists.

use crate::error::{Result, RootError};
use crate::key::Key;
use crate::rbuffer::RBuffer;

/// Directory versions above this use 64-bit seek pointers.
const LARGE_DIR_VERSION: u16 = 1000;

/// Location of a directory's key list, as recorded in its TDirectory streamer.
#[derive(Debug, Clone, Copy)]
pub struct DirHeader {
    /// Absolute position of the key list (0 for an empty directory).
    pub seek_keys: u64,
    /// Size of the key list record.
    pub nbytes_keys: u32,
}

impl DirHeader {
    /// Parse a TDirectory streamer at the cursor.
    pub fn read(r: &mut RBuffer) -> Result<Self> {
        let version = r.read_u16()?;
        let _datime_c = r.read_u32()?;
        let _datime_m = r.read_u32()?;
        let nbytes_keys = r.read_u32()?;
        let _nbytes_name = r.read_u32()?;
        let seek_keys = if version > LARGE_DIR_VERSION {
            let _seek_dir = r.read_u64()?;
            let _seek_parent = r.read_u64()?;
            r.read_u64()?
        } else {
            let _seek_dir = r.read_u32()?;
            let _seek_parent = r.read_u32()?;
            r.read_u32()? as u64
        };
        Ok(Self { seek_keys, nbytes_keys })
    }
}

/// The ordered keys of one directory.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    keys: Vec<Key>,
}

impl Directory {
    /// Read the key list a [`DirHeader`] points at.
    ///
    /// The list is itself stored behind a TKey header, followed by a u32 key
    /// count and that many TKey records.
    pub fn read(file_data: &[u8], header: DirHeader, is_large: bool) -> Result<Self> {
        if header.seek_keys == 0 {
            return Ok(Self::default());
        }
        let start = usize::try_from(header.seek_keys).map_err(|_| {
            RootError::Deserialization(format!("seek_keys too large: {}", header.seek_keys))
        })?;
        let mut r = RBuffer::at(file_data, start);
        let _list_key = Key::read(&mut r, is_large)?;
        let nkeys = r.read_u32()? as usize;

        let mut keys = Vec::with_capacity(nkeys.min(r.remaining()));
        for _ in 0..nkeys {
            keys.push(Key::read(&mut r, is_large)?);
        }
        Ok(Self { keys })
    }

    /// All keys, in file order (every cycle included).
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Keys with only the highest cycle kept per name, in first-seen order.
    pub fn latest_keys(&self) -> Vec<&Key> {
        let mut out: Vec<&Key> = Vec::with_capacity(self.keys.len());
        for key in &self.keys {
            match out.iter_mut().find(|k| k.name == key.name) {
                Some(slot) if slot.cycle < key.cycle => *slot = key,
                Some(_) => {}
                None => out.push(key),
            }
        }
        out
    }

    /// Find a key by name, preferring the highest cycle.
    pub fn find_key(&self, name: &str) -> Option<&Key> {
        self.keys.iter().filter(|k| k.name == name).max_by_key(|k| k.cycle)
    }
}

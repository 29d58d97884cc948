//! Cursor over ROOT's big-endian serialization format.

use crate::error::{Result, RootError};

/// Set on the first u32 of a streamed object when a byte count precedes the version.
const BYTE_COUNT_MASK: u32 = 0x4000_0000;

/// `TObject::kIsReferenced`; when set, a 2-byte process id follows `fBits`.
const IS_REFERENCED: u32 = 1 << 4;

macro_rules! read_be {
    ($(#[$doc:meta] $name:ident -> $ty:ty;)*) => {
        $(
            #[$doc]
            pub fn $name(&mut self) -> Result<$ty> {
                const N: usize = std::mem::size_of::<$ty>();
                let b = self.read_bytes(N)?;
                let mut raw = [0u8; N];
                raw.copy_from_slice(b);
                Ok(<$ty>::from_be_bytes(raw))
            }
        )*
    };
}

/// A cursor-based reader over a byte slice.
pub struct RBuffer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> RBuffer<'a> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Create a reader positioned at `pos`.
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    /// Current read position.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Move the cursor to an absolute position.
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Skip `n` bytes forward.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    /// Borrow the next `n` bytes and advance past them.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    read_be! {
        /// Read a u8.
        read_u8 -> u8;
        /// Read an i8.
        read_i8 -> i8;
        /// Read a big-endian u16.
        read_u16 -> u16;
        /// Read a big-endian i16.
        read_i16 -> i16;
        /// Read a big-endian u32.
        read_u32 -> u32;
        /// Read a big-endian i32.
        read_i32 -> i32;
        /// Read a big-endian u64.
        read_u64 -> u64;
        /// Read a big-endian f32.
        read_f32 -> f32;
        /// Read a big-endian f64.
        read_f64 -> f64;
    }

    /// Read a ROOT string: one length byte, or `255` followed by a u32 length.
    pub fn read_string(&mut self) -> Result<String> {
        let len = match self.read_u8()? {
            255 => self.read_u32()? as usize,
            n => n as usize,
        };
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Read a streamer version header.
    ///
    /// Returns the version and, when a byte count is present, the absolute
    /// position where the streamed object ends.
    pub fn read_version(&mut self) -> Result<(u16, Option<usize>)> {
        let start = self.pos;
        let raw = self.read_u32()?;
        if raw & BYTE_COUNT_MASK != 0 {
            let byte_count = (raw & !BYTE_COUNT_MASK) as usize;
            let version = self.read_u16()?;
            Ok((version, Some(start + 4 + byte_count)))
        } else {
            // No byte count: the first two bytes were the version.
            self.pos = start + 2;
            Ok(((raw >> 16) as u16, None))
        }
    }

    /// Skip an embedded object whose header carries a byte count.
    pub fn skip_object(&mut self) -> Result<()> {
        let (_ver, end) = self.read_version()?;
        if let Some(end) = end {
            self.seek_forward(end)?;
        }
        Ok(())
    }

    /// Jump to `end` if it lies ahead of the cursor.
    pub fn seek_forward(&mut self, end: usize) -> Result<()> {
        if end > self.data.len() {
            return Err(RootError::BufferUnderflow {
                offset: self.pos,
                need: end.saturating_sub(self.pos),
                have: self.remaining(),
            });
        }
        if end > self.pos {
            self.pos = end;
        }
        Ok(())
    }

    /// Read a `TObject` header (`fUniqueID`, `fBits`).
    pub fn read_tobject(&mut self) -> Result<(u32, u32)> {
        let _ver = self.read_u16()?;
        let unique_id = self.read_u32()?;
        let bits = self.read_u32()?;
        if bits & IS_REFERENCED != 0 {
            self.skip(2)?;
        }
        Ok((unique_id, bits))
    }

    /// Read a `TNamed` and return `(name, title)`.
    pub fn read_tnamed(&mut self) -> Result<(String, String)> {
        let (_ver, end) = self.read_version()?;
        self.read_tobject()?;
        let name = self.read_string()?;
        let title = self.read_string()?;
        if let Some(end) = end {
            self.seek_forward(end)?;
        }
        Ok((name, title))
    }

    /// Read a length-prefixed ROOT `TArray*` and widen every element to f64.
    pub fn read_tarray(&mut self, elem: ArrayElem) -> Result<Vec<f64>> {
        let n = self.read_u32()? as usize;
        self.ensure(n.saturating_mul(elem.width()))?;
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            let v = match elem {
                ArrayElem::F64 => self.read_f64()?,
                ArrayElem::F32 => self.read_f32()? as f64,
                ArrayElem::I32 => self.read_i32()? as f64,
                ArrayElem::I16 => self.read_i16()? as f64,
                ArrayElem::I8 => self.read_i8()? as f64,
            };
            out.push(v);
        }
        Ok(out)
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if self.pos.saturating_add(n) > self.data.len() {
            return Err(RootError::BufferUnderflow {
                offset: self.pos,
                need: n,
                have: self.remaining(),
            });
        }
        Ok(())
    }
}

/// Element type of a ROOT `TArray` (`TArrayD`, `TArrayF`, `TArrayI`, `TArrayS`, `TArrayC`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayElem {
    /// `TArrayD`
    F64,
    /// `TArrayF`
    F32,
    /// `TArrayI`
    I32,
    /// `TArrayS`
    I16,
    /// `TArrayC`
    I8,
}

impl ArrayElem {
    fn width(self) -> usize {
        match self {
            ArrayElem::F64 => 8,
            ArrayElem::F32 | ArrayElem::I32 => 4,
            ArrayElem::I16 => 2,
            ArrayElem::I8 => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_primitives() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x40, 0x09, 0x21, 0xfb, 0x54, 0x44, 0x2d, 0x18];
        let mut r = RBuffer::new(&data);
        assert_eq!(r.read_u32().unwrap(), 0x0102_0304);
        assert!((r.read_f64().unwrap() - std::f64::consts::PI).abs() < 1e-15);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn read_long_string() {
        let mut data = vec![255u8];
        data.extend_from_slice(&300u32.to_be_bytes());
        data.extend(std::iter::repeat_n(b'x', 300));
        let mut r = RBuffer::new(&data);
        assert_eq!(r.read_string().unwrap().len(), 300);
    }

    #[test]
    fn version_with_byte_count_reports_absolute_end() {
        let mut data = vec![0u8; 3];
        data.extend_from_slice(&0x4000_0010u32.to_be_bytes());
        data.extend_from_slice(&3u16.to_be_bytes());
        data.extend_from_slice(&[0u8; 20]);
        let mut r = RBuffer::at(&data, 3);
        let (ver, end) = r.read_version().unwrap();
        assert_eq!(ver, 3);
        assert_eq!(end, Some(3 + 4 + 16));
    }

    #[test]
    fn version_without_byte_count_rewinds() {
        let data = [0x00, 0x05, 0xAA, 0xBB];
        let mut r = RBuffer::new(&data);
        let (ver, end) = r.read_version().unwrap();
        assert_eq!(ver, 5);
        assert!(end.is_none());
        assert_eq!(r.read_u8().unwrap(), 0xAA);
    }

    #[test]
    fn tarray_widens_integers() {
        let mut data = Vec::new();
        data.extend_from_slice(&2u32.to_be_bytes());
        data.extend_from_slice(&(-3i16).to_be_bytes());
        data.extend_from_slice(&7i16.to_be_bytes());
        let mut r = RBuffer::new(&data);
        assert_eq!(r.read_tarray(ArrayElem::I16).unwrap(), vec![-3.0, 7.0]);
    }

    #[test]
    fn underflow_is_reported() {
        let data = [0u8; 2];
        let mut r = RBuffer::new(&data);
        assert!(matches!(r.read_u32(), Err(RootError::BufferUnderflow { need: 4, have: 2, .. })));
    }
}

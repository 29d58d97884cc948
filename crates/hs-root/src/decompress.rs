//! ROOT compression blocks.
//!
//! A compressed object payload is a sequence of blocks, each with a 9-byte header:
//! ```text
//! bytes 0-1:  algorithm tag ("ZL", "L4", "ZS", "XZ")
//! byte  2:    method (ignored)
//! bytes 3-5:  compressed size   (little-endian u24)
//! bytes 6-8:  uncompressed size (little-endian u24)
//! ```

use std::io::Read;

use crate::error::{Result, RootError};

const BLOCK_HEADER_LEN: usize = 9;

/// LZ4 blocks carry an xxhash64 of the payload ahead of the LZ4 stream.
const LZ4_CHECKSUM_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Codec {
    Zlib,
    Lz4,
    Zstd,
    Xz,
}

impl Codec {
    fn from_tag(tag: &[u8]) -> Result<Self> {
        match tag {
            b"ZL" => Ok(Codec::Zlib),
            b"L4" => Ok(Codec::Lz4),
            b"ZS" => Ok(Codec::Zstd),
            b"XZ" => Ok(Codec::Xz),
            other => Err(RootError::Decompression(format!(
                "unsupported compression algorithm {:?}",
                String::from_utf8_lossy(other)
            ))),
        }
    }

    fn inflate(self, data: &[u8], expected: usize) -> Result<Vec<u8>> {
        match self {
            Codec::Zlib => inflate_zlib(data, expected),
            Codec::Lz4 => inflate_lz4(data, expected),
            Codec::Zstd => inflate_zstd(data, expected),
            Codec::Xz => inflate_xz(data, expected),
        }
    }
}

/// Decompress a sequence of ROOT blocks into exactly `expected_len` bytes.
pub fn decompress(src: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected_len);
    let mut offset = 0;

    while out.len() < expected_len && offset + BLOCK_HEADER_LEN <= src.len() {
        let header = &src[offset..offset + BLOCK_HEADER_LEN];
        let codec = Codec::from_tag(&header[0..2])?;
        let c_size = read_le24(&header[3..6]);
        let u_size = read_le24(&header[6..9]);
        offset += BLOCK_HEADER_LEN;

        let end = offset + c_size;
        if end > src.len() {
            return Err(RootError::Decompression(format!(
                "block claims {} compressed bytes but only {} remain",
                c_size,
                src.len() - offset
            )));
        }

        let block = codec.inflate(&src[offset..end], u_size)?;
        if block.len() != u_size {
            return Err(RootError::Decompression(format!(
                "{codec:?} block inflated to {} bytes, header says {u_size}",
                block.len()
            )));
        }
        out.extend_from_slice(&block);
        offset = end;
    }

    if out.len() != expected_len {
        return Err(RootError::Decompression(format!(
            "inflated {} bytes, expected {expected_len}",
            out.len()
        )));
    }
    Ok(out)
}

fn inflate_zlib(data: &[u8], expected: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected);
    flate2::read::ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| RootError::Decompression(format!("zlib: {e}")))?;
    Ok(out)
}

fn inflate_lz4(data: &[u8], expected: usize) -> Result<Vec<u8>> {
    let payload = data.get(LZ4_CHECKSUM_LEN..).ok_or_else(|| {
        RootError::Decompression("lz4 block shorter than its checksum prefix".into())
    })?;
    lz4_flex::decompress(payload, expected)
        .map_err(|e| RootError::Decompression(format!("lz4: {e}")))
}

fn inflate_zstd(data: &[u8], expected: usize) -> Result<Vec<u8>> {
    let mut out = vec![0u8; expected];
    let written = ruzstd::decoding::FrameDecoder::new()
        .decode_all(data, &mut out)
        .map_err(|e| RootError::Decompression(format!("zstd: {e}")))?;
    out.truncate(written);
    Ok(out)
}

fn inflate_xz(data: &[u8], expected: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected);
    lzma_rs::xz_decompress(&mut std::io::BufReader::new(data), &mut out)
        .map_err(|e| RootError::Decompression(format!("xz: {e}")))?;
    Ok(out)
}

fn read_le24(b: &[u8]) -> usize {
    b[0] as usize | (b[1] as usize) << 8 | (b[2] as usize) << 16
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &[u8] = b"bin contents bin contents bin contents 0123456789 0123456789";

    fn block(tag: &[u8; 2], method: u8, compressed: &[u8], u_len: usize) -> Vec<u8> {
        let mut out = tag.to_vec();
        out.push(method);
        out.extend_from_slice(&(compressed.len() as u32).to_le_bytes()[..3]);
        out.extend_from_slice(&(u_len as u32).to_le_bytes()[..3]);
        out.extend_from_slice(compressed);
        out
    }

    #[test]
    fn le24() {
        assert_eq!(read_le24(&[0x10, 0x00, 0x00]), 16);
        assert_eq!(read_le24(&[0x00, 0x01, 0x00]), 256);
        assert_eq!(read_le24(&[0xff, 0xff, 0xff]), 0xFF_FFFF);
    }

    #[test]
    fn zlib_block() {
        use std::io::Write;
        let mut enc =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(PAYLOAD).unwrap();
        let src = block(b"ZL", 8, &enc.finish().unwrap(), PAYLOAD.len());
        assert_eq!(decompress(&src, PAYLOAD.len()).unwrap(), PAYLOAD);
    }

    #[test]
    fn lz4_block_skips_checksum() {
        let mut compressed = vec![0u8; LZ4_CHECKSUM_LEN];
        compressed.extend(lz4_flex::compress(PAYLOAD));
        let src = block(b"L4", 1, &compressed, PAYLOAD.len());
        assert_eq!(decompress(&src, PAYLOAD.len()).unwrap(), PAYLOAD);
    }

    #[test]
    fn zstd_block() {
        let compressed = ruzstd::encoding::compress_to_vec(
            PAYLOAD,
            ruzstd::encoding::CompressionLevel::Fastest,
        );
        let src = block(b"ZS", 1, &compressed, PAYLOAD.len());
        assert_eq!(decompress(&src, PAYLOAD.len()).unwrap(), PAYLOAD);
    }

    #[test]
    fn xz_block() {
        let mut compressed = Vec::new();
        lzma_rs::xz_compress(&mut std::io::BufReader::new(PAYLOAD), &mut compressed).unwrap();
        let src = block(b"XZ", 1, &compressed, PAYLOAD.len());
        assert_eq!(decompress(&src, PAYLOAD.len()).unwrap(), PAYLOAD);
    }

    #[test]
    fn multiple_blocks_concatenate() {
        use std::io::Write;
        let (a, b) = PAYLOAD.split_at(20);
        let mut src = Vec::new();
        for part in [a, b] {
            let mut enc =
                flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
            enc.write_all(part).unwrap();
            src.extend(block(b"ZL", 8, &enc.finish().unwrap(), part.len()));
        }
        assert_eq!(decompress(&src, PAYLOAD.len()).unwrap(), PAYLOAD);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let src = block(b"QQ", 0, b"abc", 3);
        assert!(matches!(decompress(&src, 3), Err(RootError::Decompression(_))));
    }

    #[test]
    fn truncated_block_is_rejected() {
        let mut src = block(b"ZL", 8, b"abcdef", 6);
        src.truncate(src.len() - 2);
        assert!(matches!(decompress(&src, 6), Err(RootError::Decompression(_))));
    }
}

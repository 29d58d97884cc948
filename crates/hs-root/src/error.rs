//! Error types for ROOT file reading.

use thiserror::Error;

/// Errors raised while opening or decoding a ROOT file.
#[derive(Error, Debug)]
pub enum RootError {
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input does not start with the `root` magic, or is too short to hold a header.
    #[error("not a ROOT file (bad magic or truncated header)")]
    BadMagic,

    /// A read ran past the end of the available bytes.
    #[error("buffer underflow at offset {offset}: need {need} bytes, have {have}")]
    BufferUnderflow {
        /// Cursor position when the read was attempted.
        offset: usize,
        /// Bytes requested.
        need: usize,
        /// Bytes available.
        have: usize,
    },

    /// A compressed block could not be inflated.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// The streamed object layout did not match expectations.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// No key with this name (or path) exists.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// The object's class has no decoder.
    #[error("unsupported class: {0}")]
    UnsupportedClass(String),
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, RootError>;

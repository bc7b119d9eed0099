//! Sector codec adapter
//!
//! Dispatches sector payloads to the codecs MPQ archives use in practice:
//! deflate (flate2) and PKWare implode (pklib). Huffman, ADPCM and bzip2
//! sectors are recognised by their mask bits and rejected with
//! [`CodecError::Unsupported`].

mod algorithms;
mod compress;
mod decompress;
mod methods;

use std::fmt::Display;
use thiserror::Error;

pub use compress::{compress, compress_sector};
pub use decompress::{decompress, decompress_imploded};
pub use methods::{CompressionMethod, flags};

/// Result type of the codec layer
pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Failure to encode or decode a sector
#[derive(Error, Debug)]
pub enum CodecError {
    /// The codec is recognised but not implemented
    #[error("{0} compression is not supported")]
    Unsupported(CompressionMethod),

    /// The codec rejected its input
    #[error("{method} data is corrupt: {reason}")]
    Corrupt {
        /// Codec that failed
        method: CompressionMethod,
        /// Message reported by the codec
        reason: String,
    },

    /// The mask byte names no known codec
    #[error("Unknown compression mask 0x{0:02X}")]
    UnknownMask(u8),

    /// A compressed sector with no bytes at all
    #[error("Empty compressed sector")]
    Empty,

    /// The codec produced the wrong number of bytes
    #[error("Sector decompressed to {actual} bytes, expected {expected}")]
    SizeMismatch {
        /// Size the sector should have
        expected: usize,
        /// Size the codec produced
        actual: usize,
    },
}

impl CodecError {
    pub(crate) fn corrupt(method: CompressionMethod, reason: impl Display) -> Self {
        Self::Corrupt {
            method,
            reason: reason.to_string(),
        }
    }
}

//! Sector decompression
//!
//! A compressed sector starts with a mask byte naming the codecs applied to
//! it. Codecs are undone in a fixed order, each one feeding the next.

use super::algorithms::{pkware, zlib};
use super::methods::CompressionMethod;
use super::{CodecError, CodecResult};

/// Decompress one sector to exactly `expected_size` bytes.
///
/// A sector whose stored length already equals `expected_size` was not
/// compressed and is returned as is.
pub fn decompress(data: &[u8], expected_size: usize) -> CodecResult<Vec<u8>> {
    if data.len() == expected_size {
        return Ok(data.to_vec());
    }

    let Some((&mask, payload)) = data.split_first() else {
        return Err(CodecError::Empty);
    };

    let methods = CompressionMethod::from_mask(mask);
    if methods.is_empty() {
        return Err(CodecError::UnknownMask(mask));
    }

    let mut buffer = payload.to_vec();
    for method in methods {
        log::trace!(
            "Applying {} to {} bytes (expecting {})",
            method,
            buffer.len(),
            expected_size
        );
        buffer = match method {
            CompressionMethod::Implode => pkware::decompress(&buffer)?,
            CompressionMethod::Deflate => zlib::decompress(&buffer, expected_size)?,
            unsupported => return Err(CodecError::Unsupported(unsupported)),
        };
    }

    check_size(buffer, expected_size)
}

/// Decompress a sector written with the legacy implode block flag, which has no mask byte
pub fn decompress_imploded(data: &[u8], expected_size: usize) -> CodecResult<Vec<u8>> {
    if data.len() == expected_size {
        return Ok(data.to_vec());
    }

    check_size(pkware::decompress(data)?, expected_size)
}

fn check_size(buffer: Vec<u8>, expected: usize) -> CodecResult<Vec<u8>> {
    if buffer.len() == expected {
        Ok(buffer)
    } else {
        Err(CodecError::SizeMismatch {
            expected,
            actual: buffer.len(),
        })
    }
}

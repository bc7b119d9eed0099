//! Sector compression

use super::algorithms::{pkware, zlib};
use super::methods::CompressionMethod;
use super::{CodecError, CodecResult};

/// Compress data with a single codec, without the mask byte
pub fn compress(data: &[u8], method: CompressionMethod) -> CodecResult<Vec<u8>> {
    match method {
        CompressionMethod::Stored => Ok(data.to_vec()),
        CompressionMethod::Deflate => zlib::compress(data),
        CompressionMethod::Implode => pkware::compress(data),
        unsupported => Err(CodecError::Unsupported(unsupported)),
    }
}

/// Compress one sector for storage.
///
/// Returns `mask byte + payload` when that is strictly smaller than the
/// sector, otherwise the sector unchanged.
pub fn compress_sector(data: &[u8], method: CompressionMethod) -> CodecResult<Vec<u8>> {
    if method == CompressionMethod::Stored {
        return Ok(data.to_vec());
    }

    let compressed = compress(data, method)?;

    if 1 + compressed.len() >= data.len() {
        Ok(data.to_vec())
    } else {
        let mut result = Vec::with_capacity(1 + compressed.len());
        result.push(method.mask());
        result.extend_from_slice(&compressed);
        Ok(result)
    }
}

//! PKWare DCL (implode) support using pklib

use crate::compression::{CodecError, CodecResult, CompressionMethod};
use pklib::{CompressionMode, DictionarySize, explode_bytes, implode_bytes};

/// Decompress PKWare compressed data
pub(crate) fn decompress(data: &[u8]) -> CodecResult<Vec<u8>> {
    log::trace!(
        "PKWare decompress input: {} bytes, first 16 bytes: {:02X?}",
        data.len(),
        &data[..16.min(data.len())]
    );

    explode_bytes(data).map_err(|e| CodecError::corrupt(CompressionMethod::Implode, e))
}

/// Compress data using PKWare DCL, ASCII mode with a 2 KiB dictionary
pub(crate) fn compress(data: &[u8]) -> CodecResult<Vec<u8>> {
    implode_bytes(data, CompressionMode::ASCII, DictionarySize::Size2K)
        .map_err(|e| CodecError::corrupt(CompressionMethod::Implode, e))
}

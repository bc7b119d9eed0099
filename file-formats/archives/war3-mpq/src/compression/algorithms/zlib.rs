//! Zlib compression and decompression

use crate::compression::{CodecError, CodecResult, CompressionMethod};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use std::io::{Read, Write};

/// Decompress a zlib stream, reading at most one byte past `expected_size`
pub(crate) fn decompress(data: &[u8], expected_size: usize) -> CodecResult<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data).take(expected_size as u64 + 1);
    let mut decompressed = Vec::with_capacity(expected_size);

    decoder.read_to_end(&mut decompressed).map_err(|e| {
        log::trace!(
            "First 16 bytes of data: {:02X?}",
            &data[..16.min(data.len())]
        );
        CodecError::corrupt(CompressionMethod::Deflate, e)
    })?;

    Ok(decompressed)
}

/// Compress using zlib at the default level
pub(crate) fn compress(data: &[u8]) -> CodecResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| CodecError::corrupt(CompressionMethod::Deflate, e))?;
    encoder
        .finish()
        .map_err(|e| CodecError::corrupt(CompressionMethod::Deflate, e))
}

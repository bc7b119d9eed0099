//! Compression method definitions and flags

use std::fmt;

/// Compression mask bits of a sector's leading byte
pub mod flags {
    /// Huffman encoding (WAVE files only)
    pub const HUFFMAN: u8 = 0x01;
    /// Deflate/zlib compression
    pub const ZLIB: u8 = 0x02;
    /// PKWare DCL (implode) compression
    pub const PKWARE: u8 = 0x08;
    /// BZip2 compression
    pub const BZIP2: u8 = 0x10;
    /// IMA ADPCM mono
    pub const ADPCM_MONO: u8 = 0x40;
    /// IMA ADPCM stereo
    pub const ADPCM_STEREO: u8 = 0x80;
}

/// A sector codec, either one this crate decodes or one it recognises and rejects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    /// Sector stored verbatim, no mask byte
    Stored,
    /// Deflate/zlib compression
    Deflate,
    /// PKWare DCL (implode) compression
    Implode,
    /// Huffman encoding
    UnsupportedHuffman,
    /// IMA ADPCM mono
    UnsupportedAdpcmMono,
    /// IMA ADPCM stereo
    UnsupportedAdpcmStereo,
    /// BZip2 compression
    UnsupportedBzip2,
}

/// Order in which mask bits are decoded
const DECODE_ORDER: [(u8, CompressionMethod); 6] = [
    (flags::BZIP2, CompressionMethod::UnsupportedBzip2),
    (flags::PKWARE, CompressionMethod::Implode),
    (flags::ZLIB, CompressionMethod::Deflate),
    (flags::HUFFMAN, CompressionMethod::UnsupportedHuffman),
    (flags::ADPCM_STEREO, CompressionMethod::UnsupportedAdpcmStereo),
    (flags::ADPCM_MONO, CompressionMethod::UnsupportedAdpcmMono),
];

impl CompressionMethod {
    /// The codecs named by a mask byte, in decode order
    pub fn from_mask(mask: u8) -> Vec<Self> {
        DECODE_ORDER
            .iter()
            .filter(|(bit, _)| mask & bit != 0)
            .map(|&(_, method)| method)
            .collect()
    }

    /// The mask bit of this codec, `0` for stored sectors
    pub fn mask(self) -> u8 {
        match self {
            Self::Stored => 0,
            Self::Deflate => flags::ZLIB,
            Self::Implode => flags::PKWARE,
            Self::UnsupportedHuffman => flags::HUFFMAN,
            Self::UnsupportedAdpcmMono => flags::ADPCM_MONO,
            Self::UnsupportedAdpcmStereo => flags::ADPCM_STEREO,
            Self::UnsupportedBzip2 => flags::BZIP2,
        }
    }

    /// Whether this crate can decode the codec
    pub fn is_supported(self) -> bool {
        matches!(self, Self::Stored | Self::Deflate | Self::Implode)
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stored => "stored",
            Self::Deflate => "deflate",
            Self::Implode => "implode",
            Self::UnsupportedHuffman => "huffman",
            Self::UnsupportedAdpcmMono => "adpcm mono",
            Self::UnsupportedAdpcmStereo => "adpcm stereo",
            Self::UnsupportedBzip2 => "bzip2",
        };
        f.write_str(name)
    }
}

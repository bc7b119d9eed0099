//! Sector codec tests across the public compression API

use crate::common::{generate_repetitive_data, random_data};
use pretty_assertions::assert_eq;
use war3_mpq::compression::{
    CodecError, CompressionMethod, compress, compress_sector, decompress, decompress_imploded,
    flags,
};

#[test]
fn test_deflate_sector_round_trip() {
    let data = generate_repetitive_data(b"Name=Crystal Maiden\r\n", 4096);
    let sector = compress_sector(&data, CompressionMethod::Deflate).unwrap();

    assert_eq!(sector[0], flags::ZLIB);
    assert_eq!(decompress(&sector, data.len()).unwrap(), data);
}

#[test]
fn test_implode_sector_round_trip() {
    let data = generate_repetitive_data(b"call SetHeroLevel(u, 25, false)\r\n", 4096);
    let sector = compress_sector(&data, CompressionMethod::Implode).unwrap();

    assert_eq!(sector[0], flags::PKWARE);
    assert_eq!(decompress(&sector, data.len()).unwrap(), data);
}

#[test]
fn test_legacy_implode_has_no_mask() {
    let data = generate_repetitive_data(b"Art=BTNTavern.blp\r\n", 2048);
    let imploded = compress(&data, CompressionMethod::Implode).unwrap();

    assert_eq!(decompress_imploded(&imploded, data.len()).unwrap(), data);
}

#[test]
fn test_incompressible_sector_is_stored() {
    let data = random_data(7, 4096);
    let sector = compress_sector(&data, CompressionMethod::Deflate).unwrap();

    assert_eq!(sector, data);
    assert_eq!(decompress(&sector, data.len()).unwrap(), data);
}

#[test]
fn test_unsupported_codecs() {
    let payload = [0u8; 16];
    for (mask, method) in [
        (flags::BZIP2, CompressionMethod::UnsupportedBzip2),
        (flags::HUFFMAN, CompressionMethod::UnsupportedHuffman),
        (flags::ADPCM_MONO, CompressionMethod::UnsupportedAdpcmMono),
        (flags::ADPCM_STEREO, CompressionMethod::UnsupportedAdpcmStereo),
    ] {
        let mut sector = vec![mask];
        sector.extend_from_slice(&payload);

        match decompress(&sector, 4096) {
            Err(CodecError::Unsupported(found)) => assert_eq!(found, method),
            other => panic!("expected unsupported {method}, got {other:?}"),
        }
    }
}

#[test]
fn test_bad_sectors() {
    assert!(matches!(decompress(&[], 16), Err(CodecError::Empty)));
    assert!(matches!(
        decompress(&[0x04, 1, 2, 3], 16),
        Err(CodecError::UnknownMask(0x04))
    ));
    assert!(matches!(
        decompress(&[flags::ZLIB, 0xDE, 0xAD], 16),
        Err(CodecError::Corrupt { .. })
    ));
}

#[test]
fn test_size_mismatch() {
    let data = vec![0u8; 1024];
    let sector = compress_sector(&data, CompressionMethod::Deflate).unwrap();

    assert!(matches!(
        decompress(&sector, 2048),
        Err(CodecError::SizeMismatch {
            expected: 2048,
            actual: 1024
        })
    ));
}

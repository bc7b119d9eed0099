//! Name hashing and per-file key derivation

use super::keys::{ASCII_TO_UPPER, ENCRYPTION_TABLE};
use super::types::hash_type;
use crate::tables::BlockEntry;

/// Hash a string using the MPQ hash algorithm
pub fn hash_string(filename: &str, hash_type: u32) -> u32 {
    let mut seed1: u32 = 0x7FED7FED;
    let mut seed2: u32 = 0xEEEEEEEE;

    for &byte in filename.as_bytes() {
        let mut ch = byte;

        // Convert path separators to backslash
        if ch == b'/' {
            ch = b'\\';
        }

        ch = ASCII_TO_UPPER[ch as usize];

        let table_idx = ((hash_type << 8) + ch as u32) as usize;
        seed1 = ENCRYPTION_TABLE[table_idx] ^ (seed1.wrapping_add(seed2));
        seed2 = (ch as u32)
            .wrapping_add(seed1)
            .wrapping_add(seed2)
            .wrapping_add(seed2 << 5)
            .wrapping_add(3);
    }

    seed1
}

/// The last component of an archive path, after the final `\` or `/`
pub fn plain_name(filename: &str) -> &str {
    filename
        .rfind(['\\', '/'])
        .map_or(filename, |pos| &filename[pos + 1..])
}

/// Calculate the encryption key of a file stored under `filename`.
///
/// Files flagged with [`BlockEntry::FLAG_FIX_KEY`] mix their position and
/// uncompressed size into the key, so their key changes whenever the file
/// moves within the archive.
pub fn file_key(filename: &str, block: &BlockEntry) -> u32 {
    let key = hash_string(plain_name(filename), hash_type::FILE_KEY);

    if block.has_fix_key() {
        key.wrapping_add(block.file_pos) ^ block.file_size
    } else {
        key
    }
}

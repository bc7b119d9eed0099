//! Encryption operations for MPQ files

use super::keys::ENCRYPTION_TABLE;

/// Encrypt a block of data
pub fn encrypt_block(data: &mut [u32], mut key: u32) {
    let mut seed: u32 = 0xEEEEEEEE;

    for value in data.iter_mut() {
        seed = seed.wrapping_add(ENCRYPTION_TABLE[0x400 + (key & 0xFF) as usize]);

        // The seed advances on the plaintext word
        let ch = *value;
        *value = ch ^ (key.wrapping_add(seed));

        key = ((!key << 0x15).wrapping_add(0x11111111)) | (key >> 0x0B);
        seed = ch
            .wrapping_add(seed)
            .wrapping_add(seed << 5)
            .wrapping_add(3);
    }
}

/// Encrypt the 4-byte-aligned prefix of a byte buffer in place.
///
/// Words are little-endian; 1 to 3 trailing bytes are left as they are.
pub fn encrypt_bytes(data: &mut [u8], mut key: u32) {
    let mut seed: u32 = 0xEEEEEEEE;

    for chunk in data.chunks_exact_mut(4) {
        seed = seed.wrapping_add(ENCRYPTION_TABLE[0x400 + (key & 0xFF) as usize]);

        let ch = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        chunk.copy_from_slice(&(ch ^ key.wrapping_add(seed)).to_le_bytes());

        key = ((!key << 0x15).wrapping_add(0x11111111)) | (key >> 0x0B);
        seed = ch
            .wrapping_add(seed)
            .wrapping_add(seed << 5)
            .wrapping_add(3);
    }
}

//! Decryption operations for MPQ files

use super::keys::ENCRYPTION_TABLE;

/// Decrypt a block of data
pub fn decrypt_block(data: &mut [u32], mut key: u32) {
    let mut seed: u32 = 0xEEEEEEEE;

    for value in data.iter_mut() {
        seed = seed.wrapping_add(ENCRYPTION_TABLE[0x400 + (key & 0xFF) as usize]);

        let ch = *value ^ (key.wrapping_add(seed));
        *value = ch;

        key = ((!key << 0x15).wrapping_add(0x11111111)) | (key >> 0x0B);
        seed = ch
            .wrapping_add(seed)
            .wrapping_add(seed << 5)
            .wrapping_add(3);
    }
}

/// Decrypt the 4-byte-aligned prefix of a byte buffer in place
pub fn decrypt_bytes(data: &mut [u8], mut key: u32) {
    let mut seed: u32 = 0xEEEEEEEE;

    for chunk in data.chunks_exact_mut(4) {
        seed = seed.wrapping_add(ENCRYPTION_TABLE[0x400 + (key & 0xFF) as usize]);

        let encrypted = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        let ch = encrypted ^ key.wrapping_add(seed);
        chunk.copy_from_slice(&ch.to_le_bytes());

        key = ((!key << 0x15).wrapping_add(0x11111111)) | (key >> 0x0B);
        seed = ch
            .wrapping_add(seed)
            .wrapping_add(seed << 5)
            .wrapping_add(3);
    }
}

/// Decrypt a single u32 value
pub fn decrypt_dword(value: u32, key: u32) -> u32 {
    let mut data = [value];
    decrypt_block(&mut data, key);
    data[0]
}

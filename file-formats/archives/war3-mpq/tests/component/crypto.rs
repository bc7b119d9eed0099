//! Integration tests for crypto functionality

use proptest::prelude::*;
use war3_mpq::BlockEntry;
use war3_mpq::crypto::{
    ENCRYPTION_TABLE, HASH_TABLE_KEY, decrypt_block, decrypt_bytes, decrypt_dword,
    encrypt_block, encrypt_bytes, file_key, hash_string, hash_type,
};

#[test]
fn test_encryption_table_is_initialized() {
    assert_eq!(ENCRYPTION_TABLE.len(), 0x500);
    assert_eq!(ENCRYPTION_TABLE[0], 0x55C636E2);

    let sum: u64 = ENCRYPTION_TABLE.iter().map(|&x| x as u64).sum();
    assert_ne!(sum, 0);
}

#[test]
fn test_hash_table_key() {
    assert_eq!(hash_string("(hash table)", hash_type::FILE_KEY), HASH_TABLE_KEY);
}

#[test]
fn test_hash_is_case_and_separator_insensitive() {
    for hash in [hash_type::TABLE_OFFSET, hash_type::NAME_A, hash_type::NAME_B] {
        assert_eq!(
            hash_string("units/unitdata.slk", hash),
            hash_string("Units\\UnitData.slk", hash)
        );
    }
}

#[test]
fn test_decrypt_dword_matches_block() {
    let mut words = [0x6DBB9D94u32];
    decrypt_block(&mut words, 0xC1EB1CEF);
    assert_eq!(decrypt_dword(0x6DBB9D94, 0xC1EB1CEF), words[0]);
}

#[test]
fn test_byte_cipher_leaves_tail() {
    let mut data = *b"war3map.j\r\n";
    encrypt_bytes(&mut data, 0x1234_5678);
    assert_eq!(&data[8..], b"j\r\n");
    decrypt_bytes(&mut data, 0x1234_5678);
    assert_eq!(&data, b"war3map.j\r\n");
}

#[test]
fn test_key_zero_still_encrypts() {
    let mut words = [0u32; 4];
    encrypt_block(&mut words, 0);
    assert_ne!(words, [0u32; 4]);
}

#[test]
fn test_file_key_uses_plain_name() {
    let block = BlockEntry::new(100);
    assert_eq!(
        file_key("Scripts\\war3map.j", &block),
        file_key("war3map.j", &block)
    );

    let fixed = BlockEntry {
        file_pos: 0x200,
        flags: BlockEntry::FLAG_EXISTS | BlockEntry::FLAG_ENCRYPTED | BlockEntry::FLAG_FIX_KEY,
        ..block
    };
    let base = file_key("war3map.j", &block);
    assert_eq!(file_key("war3map.j", &fixed), base.wrapping_add(0x200) ^ 100);
}

proptest! {
    #[test]
    fn prop_block_cipher_is_self_inverse(
        words in proptest::collection::vec(any::<u32>(), 0..256),
        key in any::<u32>(),
    ) {
        let mut data = words.clone();
        encrypt_block(&mut data, key);
        decrypt_block(&mut data, key);
        prop_assert_eq!(data, words);
    }

    #[test]
    fn prop_byte_cipher_is_self_inverse(
        bytes in proptest::collection::vec(any::<u8>(), 0..1024),
        key in any::<u32>(),
    ) {
        let mut data = bytes.clone();
        encrypt_bytes(&mut data, key);
        decrypt_bytes(&mut data, key);
        prop_assert_eq!(data, bytes);
    }
}

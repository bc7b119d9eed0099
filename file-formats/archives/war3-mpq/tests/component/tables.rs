//! Hash and block table behaviour through their public API

use pretty_assertions::assert_eq;
use war3_mpq::{BlockEntry, BlockTable, HashEntry, HashTable};

#[test]
fn test_tables_survive_save_and_load() {
    let mut hash_table = HashTable::new(16).unwrap();
    let mut block_table = BlockTable::new();

    for name in ["war3map.j", "war3map.w3i", "Units\\UnitData.slk"] {
        let index = block_table.add(100);
        assert!(hash_table.add(name, index as u32).is_some());
    }

    let mut hash_bytes = vec![0u8; hash_table.byte_size()];
    let mut block_bytes = vec![0u8; block_table.byte_size()];
    hash_table.save(&mut hash_bytes).unwrap();
    block_table.save(&mut block_bytes).unwrap();

    let hashes = HashTable::from_bytes(&hash_bytes, 16).unwrap();
    let blocks = BlockTable::from_bytes(&block_bytes, 3).unwrap();

    assert_eq!(hashes.find_entry("Units\\UnitData.slk").unwrap().block_index, 2);
    assert_eq!(hashes.find_entry("war3map.j").unwrap().block_index, 0);
    assert_eq!(blocks.entries(), block_table.entries());
}

#[test]
fn test_tables_are_encrypted_on_disk() {
    let mut hash_table = HashTable::new(4).unwrap();
    hash_table.add("war3map.j", 0);

    let mut bytes = vec![0u8; hash_table.byte_size()];
    hash_table.save(&mut bytes).unwrap();

    // An empty slot would be all 0xFF in plaintext
    assert!(bytes.chunks(HashEntry::SIZE).all(|c| c != [0xFF; 16]));
}

#[test]
fn test_truncated_tables_are_clamped() {
    let mut block_table = BlockTable::new();
    block_table.add(10);
    block_table.add(20);

    let mut bytes = vec![0u8; block_table.byte_size()];
    block_table.save(&mut bytes).unwrap();

    let loaded = BlockTable::from_bytes(&bytes[..BlockEntry::SIZE + 5], 2).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.get(0).unwrap().file_size, 10);
}

#[test]
fn test_deleted_slots_do_not_end_lookups() {
    let mut table = HashTable::new(4).unwrap();
    table.add("a", 0);
    table.add("b", 1);
    table.add("c", 2);

    let slot = table.find("b").unwrap();
    table.get_mut(slot).unwrap().delete();

    assert!(table.find("b").is_none());
    assert_eq!(table.find_entry("a").unwrap().block_index, 0);
    assert_eq!(table.find_entry("c").unwrap().block_index, 2);

    // The tombstone is free for reuse
    assert!(table.add("d", 3).is_some());
    assert!(table.add("e", 4).is_some());
    assert!(table.add("f", 5).is_none());
}

#[test]
fn test_invalid_sizes() {
    assert!(HashTable::new(0).is_err());
    assert!(HashTable::new(12).is_err());
    assert_eq!(HashTable::clamp_size(12), Some(16));
    assert_eq!(HashTable::clamp_size(1), Some(HashTable::MIN_SIZE));
}

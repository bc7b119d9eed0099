//! Save and reload arbitrary contents

use crate::common::{generate_repetitive_data, random_data, read, save_and_reload};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use war3_mpq::{AddFileOptions, Archive, BlockEntry, OpenOptions};

fn round_trip(data: &[u8], options: AddFileOptions, sector_size: usize) -> Vec<u8> {
    let mut archive = OpenOptions::new()
        .sector_size(sector_size)
        .hash_table_size(16)
        .create()
        .unwrap();
    assert!(archive.set_with_options("Units\\UnitData.slk", data, options));

    let mut loaded = save_and_reload(&mut archive);
    read(&mut loaded, "Units\\UnitData.slk")
}

#[test]
fn test_empty_file() {
    assert_eq!(round_trip(&[], AddFileOptions::new(), 4096), Vec::<u8>::new());
}

#[test]
fn test_sector_boundaries() {
    for size in [1, 511, 512, 513, 4095, 4096, 4097, 3 * 4096] {
        let data = generate_repetitive_data(b"abc", size);
        assert_eq!(round_trip(&data, AddFileOptions::new(), 512), data);
        assert_eq!(round_trip(&data, AddFileOptions::new(), 4096), data);
    }
}

#[test]
fn test_compression_threshold() {
    let mut archive = Archive::new();
    archive.set("zeros.bin", vec![0u8; 4096]);
    archive.set("random.bin", random_data(42, 4096));
    let mut loaded = save_and_reload(&mut archive);

    let zeros = *loaded.get("zeros.bin").unwrap().block().unwrap();
    assert!(zeros.is_compressed());
    assert!(zeros.compressed_size < zeros.file_size);

    let random = *loaded.get("random.bin").unwrap().block().unwrap();
    assert_eq!(random.flags, BlockEntry::FLAG_EXISTS);
    assert_eq!(random.compressed_size, 4096);
}

#[test]
fn test_nested_archive_is_stored_verbatim() {
    let mut inner = Archive::new();
    inner.set("inner.txt", "inner");
    let inner_bytes = inner.save().unwrap();

    let mut outer = Archive::new();
    outer.set("nested.mpq", &inner_bytes);
    let mut loaded = save_and_reload(&mut outer);

    let block = *loaded.get("nested.mpq").unwrap().block().unwrap();
    assert_eq!(block.flags, BlockEntry::FLAG_EXISTS);

    let nested = read(&mut loaded, "nested.mpq");
    assert_eq!(nested, inner_bytes);
    let mut reopened = Archive::load(nested, true).unwrap();
    assert_eq!(read(&mut reopened, "inner.txt"), b"inner");
}

#[test]
fn test_many_files() {
    let mut archive = OpenOptions::new().hash_table_size(256).create().unwrap();
    let names: Vec<String> = (0..200).map(|i| format!("Textures\\Tile{i:03}.blp")).collect();
    for (i, name) in names.iter().enumerate() {
        assert!(archive.set(name, random_data(i as u64, 64 + i)));
    }

    let mut loaded = save_and_reload(&mut archive);
    assert_eq!(loaded.len(), 201);
    for (i, name) in names.iter().enumerate() {
        assert_eq!(read(&mut loaded, name), random_data(i as u64, 64 + i));
    }
}

#[test]
fn test_repeated_saves_are_stable() {
    let mut archive = Archive::new();
    archive.set("war3map.j", generate_repetitive_data(b"endfunction\r\n", 30_000));
    archive.set_with_options(
        "war3map.wts",
        random_data(1, 5_000),
        AddFileOptions::new().fix_key(true),
    );

    let first = archive.save().unwrap();
    let mut loaded = Archive::load(first.clone(), false).unwrap();
    let second = loaded.save().unwrap();
    assert_eq!(first, second);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_any_contents_round_trip(
        data in proptest::collection::vec(any::<u8>(), 0..20_000),
        encrypt in any::<bool>(),
        fix_key in any::<bool>(),
        single_unit in any::<bool>(),
    ) {
        let options = AddFileOptions::new()
            .encrypt(encrypt)
            .fix_key(fix_key)
            .single_unit(single_unit);
        prop_assert_eq!(round_trip(&data, options, 512), data);
    }

    #[test]
    fn prop_repetitive_contents_round_trip(
        pattern in proptest::collection::vec(any::<u8>(), 1..64),
        size in 0usize..50_000,
    ) {
        let data = generate_repetitive_data(&pattern, size);
        prop_assert_eq!(round_trip(&data, AddFileOptions::new().fix_key(true), 4096), data);
    }
}

//! Archive file management through the public API

use crate::common::{init_logger, read, save_and_reload};
use pretty_assertions::assert_eq;
use war3_mpq::{Archive, BlockEntry, OpenOptions};

#[test]
fn test_lookup_is_case_insensitive() {
    init_logger();
    let mut archive = Archive::new();
    archive.set("Units\\UnitData.slk", "ID;PK");

    let mut loaded = save_and_reload(&mut archive);
    assert!(loaded.has("units/unitdata.slk"));
    assert_eq!(read(&mut loaded, "UNITS\\UNITDATA.SLK"), b"ID;PK");
}

#[test]
fn test_file_handle_operations() {
    let mut archive = Archive::new();
    archive.set("war3map.j", "old");

    {
        let mut file = archive.get("war3map.j").unwrap();
        assert_eq!(file.name(), "war3map.j");
        assert!(file.is_name_resolved());
        assert_eq!(file.block_index(), 0);
        assert!(file.hash().unwrap().is_valid());

        assert!(file.set("new"));
        assert_eq!(file.text().as_deref(), Some("new"));
        assert!(file.rename("Scripts\\war3map.j"));
        assert_eq!(file.name(), "Scripts\\war3map.j");
    }

    assert!(!archive.has("war3map.j"));
    assert!(archive.get("Scripts\\war3map.j").unwrap().delete());
    assert!(archive.is_empty());
}

#[test]
fn test_rename_to_case_variant() {
    let mut archive = Archive::new();
    archive.set("war3map.j", "x");

    assert!(archive.rename("war3map.j", "WAR3MAP.J"));
    assert_eq!(archive.len(), 1);

    let loaded = save_and_reload(&mut archive);
    assert!(loaded.file_names().contains(&"WAR3MAP.J"));
}

#[test]
fn test_unlisted_files_get_placeholder_names() {
    let mut archive = Archive::new();
    archive.set("hidden.txt", "hidden");
    let mut data = archive.save().unwrap();

    // Hide the name from the (listfile)
    let at = data.windows(10).position(|w| w == b"hidden.txt").unwrap();
    data[at..at + 6].copy_from_slice(b"secret");

    let mut unlisted = Archive::load(data, false).unwrap();
    let placeholder = unlisted
        .files()
        .find(|f| !f.is_name_resolved())
        .map(|f| f.name().to_string())
        .unwrap();
    assert!(placeholder.starts_with("File"));
    assert_eq!(placeholder.len(), 12);

    // Unencrypted contents are readable once the real name is known
    assert_eq!(read(&mut unlisted, "hidden.txt"), b"hidden");
}

#[test]
fn test_delete_then_reuse_slot() {
    let mut archive = OpenOptions::new().hash_table_size(4).create().unwrap();
    for name in ["a", "b", "c"] {
        assert!(archive.set(name, name));
    }

    assert!(archive.delete("b"));
    assert!(archive.set("d", "d"));

    let mut loaded = save_and_reload(&mut archive);
    assert_eq!(loaded.len(), 4);
    for name in ["a", "c", "d"] {
        assert_eq!(read(&mut loaded, name), name.as_bytes());
    }
}

#[test]
fn test_saved_layout() {
    let mut archive = OpenOptions::new().hash_table_size(16).create().unwrap();
    archive.set("unit.txt", "HP=100\r\n");

    let data = archive.save().unwrap();
    let header = war3_mpq::header::MpqHeader::from_bytes(&data).unwrap();

    assert_eq!(header.header_size, 32);
    assert_eq!(header.archive_size as usize, data.len());
    assert_eq!(header.block_size, 3);
    assert_eq!(header.hash_table_size, 16);
    assert_eq!(header.block_table_size, 2);
    assert_eq!(header.block_table_pos, header.hash_table_pos + 16 * 16);

    // Files follow the header directly
    assert_eq!(&data[32..40], b"HP=100\r\n");

    let loaded = Archive::load(data, true).unwrap();
    assert_eq!(
        loaded.block_table().get(0).unwrap(),
        &BlockEntry {
            file_pos: 32,
            compressed_size: 8,
            file_size: 8,
            flags: BlockEntry::FLAG_EXISTS,
        }
    );
}

#[test]
fn test_save_compacts_removed_blocks() {
    let mut archive = Archive::new();
    archive.set("big.bin", vec![7u8; 100_000]);
    archive.set("small.txt", "small");
    let before = archive.save().unwrap().len();

    assert!(archive.delete("big.bin"));
    let after = archive.save().unwrap().len();
    assert!(after < before);

    let mut loaded = Archive::load(archive.save().unwrap(), false).unwrap();
    assert_eq!(loaded.block_table().len(), 2);
    assert_eq!(read(&mut loaded, "small.txt"), b"small");
}

//! Path based open and save

use crate::common::{generate_test_data, init_logger, read, temp_dir};
use pretty_assertions::assert_eq;
use war3_mpq::{Archive, Error, OpenOptions};

#[test]
fn test_save_to_and_open() {
    init_logger();
    let dir = temp_dir();
    let path = dir.path().join("test.mpq");

    let data = generate_test_data(50_000);
    let mut archive = Archive::new();
    archive.set("Units\\UnitData.slk", &data);
    archive.save_to(&path).unwrap();

    let mut reopened = Archive::open(&path).unwrap();
    assert_eq!(read(&mut reopened, "Units\\UnitData.slk"), data);
    assert!(!reopened.is_readonly());
}

#[test]
fn test_open_readonly() {
    let dir = temp_dir();
    let path = dir.path().join("readonly.mpq");

    let mut archive = Archive::new();
    archive.set("a.txt", "a");
    archive.save_to(&path).unwrap();

    let mut readonly = OpenOptions::new().readonly(true).open(&path).unwrap();
    assert!(readonly.is_readonly());
    assert_eq!(read(&mut readonly, "a.txt"), b"a");
    assert!(matches!(
        readonly.save_to(dir.path().join("copy.mpq")),
        Err(Error::ReadOnly)
    ));
    assert!(!dir.path().join("copy.mpq").exists());
}

#[test]
fn test_open_missing_file() {
    let dir = temp_dir();
    assert!(matches!(
        Archive::open(dir.path().join("missing.mpq")),
        Err(Error::Io(_))
    ));
}

#[test]
fn test_open_non_archive() {
    let dir = temp_dir();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, generate_test_data(2048)).unwrap();

    assert!(matches!(Archive::open(&path), Err(Error::NoHeader)));
}

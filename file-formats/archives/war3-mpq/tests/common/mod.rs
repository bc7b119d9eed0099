//! Common test utilities and fixtures

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tempfile::TempDir;
use war3_mpq::Archive;

/// Route `log` output through env_logger, once per test binary
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Create a temporary directory for tests
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Generate test data of a specific size
pub fn generate_test_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}

/// Generate repetitive test data (good for compression tests)
pub fn generate_repetitive_data(pattern: &[u8], total_size: usize) -> Vec<u8> {
    pattern.iter().copied().cycle().take(total_size).collect()
}

/// Incompressible data from a seeded generator
pub fn random_data(seed: u64, size: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = vec![0u8; size];
    rng.fill_bytes(&mut data);
    data
}

/// Save an archive and load the result, writable
pub fn save_and_reload(archive: &mut Archive) -> Archive {
    let data = archive.save().expect("Failed to save archive");
    Archive::load(data, false).expect("Failed to reload archive")
}

/// Decoded contents of a file, panicking when missing or undecodable
pub fn read(archive: &mut Archive, name: &str) -> Vec<u8> {
    archive
        .get(name)
        .unwrap_or_else(|| panic!("{name} not found"))
        .bytes()
        .unwrap_or_else(|| panic!("{name} failed to decode"))
        .to_vec()
}

//! Cryptographic operations for MPQ archives
//!
//! MPQ uses a single 0x500-entry table for two jobs: hashing file names into
//! the hash table, and a word-oriented stream cipher applied to the hash
//! table, the block table and file sectors.
//!
//! ## Examples
//!
//! ```no_run
//! use war3_mpq::crypto::{decrypt_block, encrypt_block, hash_string, hash_type};
//!
//! let name_a = hash_string("war3map.j", hash_type::NAME_A);
//! let name_b = hash_string("war3map.j", hash_type::NAME_B);
//!
//! let mut words = [name_a, name_b];
//! encrypt_block(&mut words, 0xC3AF3770);
//! decrypt_block(&mut words, 0xC3AF3770);
//! assert_eq!(words, [name_a, name_b]);
//! ```

mod decryption;
mod encryption;
mod hash;
mod keys;
mod types;

pub use decryption::{decrypt_block, decrypt_bytes, decrypt_dword};
pub use encryption::{encrypt_block, encrypt_bytes};
pub use hash::{file_key, hash_string, plain_name};
pub use keys::{ASCII_TO_UPPER, ENCRYPTION_TABLE};
pub use types::{BLOCK_TABLE_KEY, HASH_TABLE_KEY, hash_type};

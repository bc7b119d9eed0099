//! # war3_mpq - Warcraft III MPQ Archive Library
//!
//! A safe Rust implementation of the version 1 MPQ (Mo'PaQ) archive format
//! as used by Warcraft III maps and data files.
//!
//! ## Features
//!
//! - Loading archives from memory, including archives behind a map header
//! - Reading, adding, replacing, renaming and deleting files
//! - Deflate and PKWARE implode sectors, with encryption and offset-adjusted keys
//! - Saving a compacted archive with a regenerated `(listfile)`
//! - `HM3W` map containers
//!
//! ## Examples
//!
//! ### Reading a map
//!
//! ```no_run
//! use war3_mpq::War3Map;
//!
//! # fn main() -> Result<(), war3_mpq::Error> {
//! let data = std::fs::read("DotA.w3x")?;
//! let mut map = War3Map::load(data, true)?;
//!
//! if let Some(mut misc) = map.get("war3mapMisc.txt") {
//!     println!("{}", misc.text().unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Building an archive
//!
//! ```no_run
//! use war3_mpq::{AddFileOptions, OpenOptions};
//!
//! # fn main() -> Result<(), war3_mpq::Error> {
//! let mut archive = OpenOptions::new().hash_table_size(64).create()?;
//! archive.set("war3map.j", "function main takes nothing returns nothing");
//! archive.set_with_options(
//!     "war3map.wts",
//!     "STRING 1\r\n{\r\nDotA\r\n}",
//!     AddFileOptions::new().fix_key(true),
//! );
//!
//! archive.save_to("custom.mpq")?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod archive;
pub mod compression;
pub mod crypto;
pub mod error;
pub mod file;
pub mod header;
pub mod map;
pub mod special_files;
pub mod tables;

// Re-export commonly used types
pub use archive::{Archive, ArchiveFile, OpenOptions};
pub use error::{Error, Result};
pub use file::{AddFileOptions, FileData, MpqFile};
pub use header::MpqHeader;
pub use map::{MapHeader, War3Map, is_map};
pub use tables::{BlockEntry, BlockTable, HashEntry, HashTable};

pub use crypto::{decrypt_block, decrypt_dword, encrypt_block, hash_string, hash_type};

pub use compression::{CodecError, CompressionMethod, compress, decompress};

/// Sector size of newly created archives
pub const DEFAULT_SECTOR_SIZE: usize = 4096;

/// Hash table size of newly created archives
pub const DEFAULT_HASH_TABLE_SIZE: usize = 1024;

/// Block size calculation
#[inline]
pub fn calculate_sector_size(block_size_shift: u16) -> usize {
    512 << block_size_shift
}

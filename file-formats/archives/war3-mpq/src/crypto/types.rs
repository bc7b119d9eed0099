//! Cryptographic types and constants

/// Hash types for MPQ operations
pub mod hash_type {
    /// Hash for table offset calculation
    pub const TABLE_OFFSET: u32 = 0;
    /// First part of filename hash
    pub const NAME_A: u32 = 1;
    /// Second part of filename hash
    pub const NAME_B: u32 = 2;
    /// File encryption key generation
    pub const FILE_KEY: u32 = 3;
}

/// Key of the hash table blob, `hash_string("(hash table)", FILE_KEY)`
pub const HASH_TABLE_KEY: u32 = 0xC3AF_3770;

/// Key of the block table blob, `hash_string("(block table)", FILE_KEY)`
pub const BLOCK_TABLE_KEY: u32 = 0xEC83_B3A3;

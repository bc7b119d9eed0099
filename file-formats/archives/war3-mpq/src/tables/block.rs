//! Block table implementation for MPQ archives

use crate::crypto::{BLOCK_TABLE_KEY, decrypt_bytes, encrypt_bytes};
use crate::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;

/// Block table entry (16 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockEntry {
    /// Offset of the beginning of the file data, relative to the archive header
    pub file_pos: u32,
    /// Compressed file size
    pub compressed_size: u32,
    /// Size of uncompressed file
    pub file_size: u32,
    /// Flags for the file
    pub flags: u32,
}

impl BlockEntry {
    /// Size of one serialized entry
    pub const SIZE: usize = 16;

    /// File is compressed using PKWARE Data compression library
    pub const FLAG_IMPLODE: u32 = 0x00000100;
    /// File is compressed using one or more compression methods
    pub const FLAG_COMPRESS: u32 = 0x00000200;
    /// File is encrypted
    pub const FLAG_ENCRYPTED: u32 = 0x00010000;
    /// The decryption key for the file is adjusted by the block position
    pub const FLAG_FIX_KEY: u32 = 0x00020000;
    /// File is stored as a single unit, not split into sectors
    pub const FLAG_SINGLE_UNIT: u32 = 0x01000000;
    /// File exists in the archive
    pub const FLAG_EXISTS: u32 = 0x80000000;

    /// A fresh entry for `file_size` bytes, not yet encoded
    pub fn new(file_size: u32) -> Self {
        Self {
            file_pos: 0,
            compressed_size: 0,
            file_size,
            flags: 0,
        }
    }

    /// Check if the file is compressed (with a mask byte per sector)
    pub fn is_compressed(&self) -> bool {
        (self.flags & Self::FLAG_COMPRESS) != 0
    }

    /// Check if the file uses the legacy implode flag
    pub fn is_imploded(&self) -> bool {
        (self.flags & Self::FLAG_IMPLODE) != 0 && !self.is_compressed()
    }

    /// Check if the file's sectors are delimited by a sector offset table
    pub fn has_sector_table(&self) -> bool {
        (self.flags & (Self::FLAG_IMPLODE | Self::FLAG_COMPRESS)) != 0
    }

    /// Check if the file is encrypted
    pub fn is_encrypted(&self) -> bool {
        (self.flags & Self::FLAG_ENCRYPTED) != 0
    }

    /// Check if the file is stored as a single unit
    pub fn is_single_unit(&self) -> bool {
        (self.flags & Self::FLAG_SINGLE_UNIT) != 0
    }

    /// Check if the file exists
    pub fn exists(&self) -> bool {
        (self.flags & Self::FLAG_EXISTS) != 0
    }

    /// Check if the file uses fixed key encryption
    pub fn has_fix_key(&self) -> bool {
        (self.flags & Self::FLAG_FIX_KEY) != 0
    }

    /// Read a block entry from raw bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(Error::invalid_format("Block entry too small"));
        }

        let mut cursor = Cursor::new(data);
        Ok(Self {
            file_pos: cursor.read_u32::<LittleEndian>()?,
            compressed_size: cursor.read_u32::<LittleEndian>()?,
            file_size: cursor.read_u32::<LittleEndian>()?,
            flags: cursor.read_u32::<LittleEndian>()?,
        })
    }

    fn write(&self, cursor: &mut Cursor<&mut [u8]>) -> Result<()> {
        cursor.write_u32::<LittleEndian>(self.file_pos)?;
        cursor.write_u32::<LittleEndian>(self.compressed_size)?;
        cursor.write_u32::<LittleEndian>(self.file_size)?;
        cursor.write_u32::<LittleEndian>(self.flags)?;
        Ok(())
    }
}

/// Block table, index-aligned with the archive's files
#[derive(Debug, Clone, Default)]
pub struct BlockTable {
    entries: Vec<BlockEntry>,
}

impl BlockTable {
    /// Create a new empty block table
    pub fn new() -> Self {
        Self::default()
    }

    /// Decrypt and parse up to `count` entries from an encrypted table blob.
    ///
    /// The count is clamped to the number of whole entries in `data`.
    pub fn from_bytes(data: &[u8], count: usize) -> Result<Self> {
        let count = count.min(data.len() / BlockEntry::SIZE);
        let mut raw_data = data[..count * BlockEntry::SIZE].to_vec();
        decrypt_bytes(&mut raw_data, BLOCK_TABLE_KEY);

        let entries = raw_data
            .chunks_exact(BlockEntry::SIZE)
            .map(BlockEntry::from_bytes)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    /// Serialize and encrypt the table into `out`
    pub fn save(&self, out: &mut [u8]) -> Result<()> {
        let size = self.byte_size();
        if out.len() < size {
            return Err(Error::block_table(format!(
                "Output buffer holds {} bytes, table needs {}",
                out.len(),
                size
            )));
        }

        let out = &mut out[..size];
        let mut cursor = Cursor::new(&mut *out);
        for entry in &self.entries {
            entry.write(&mut cursor)?;
        }
        encrypt_bytes(out, BLOCK_TABLE_KEY);
        Ok(())
    }

    /// Append a fresh entry for a buffer of `file_size` bytes, returning its index
    pub fn add(&mut self, file_size: u32) -> usize {
        self.entries.push(BlockEntry::new(file_size));
        self.entries.len() - 1
    }

    /// Remove the entry at `index`, shifting later entries down by one
    pub fn remove(&mut self, index: usize) -> Option<BlockEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    /// Get all entries
    pub fn entries(&self) -> &[BlockEntry] {
        &self.entries
    }

    /// Get a specific entry
    pub fn get(&self, index: usize) -> Option<&BlockEntry> {
        self.entries.get(index)
    }

    /// Get a mutable reference to a specific entry
    pub fn get_mut(&mut self, index: usize) -> Option<&mut BlockEntry> {
        self.entries.get_mut(index)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Size of the serialized table in bytes
    pub fn byte_size(&self) -> usize {
        self.entries.len() * BlockEntry::SIZE
    }
}

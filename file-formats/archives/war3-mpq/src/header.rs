//! MPQ header structures and parsing

use crate::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;

/// MPQ archive header signature ('MPQ\x1A')
pub const MPQ_HEADER_SIGNATURE: u32 = 0x1A51504D;

/// Header alignment requirement (512 bytes)
pub const HEADER_ALIGNMENT: usize = 0x200;

/// Size of the version 1 header written by this crate
pub const HEADER_SIZE: u32 = 0x20;

/// Largest sector size shift accepted from a header
pub const MAX_SECTOR_SHIFT: u16 = 15;

/// Main MPQ header structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MpqHeader {
    /// Size of the archive header
    pub header_size: u32,
    /// Size of MPQ archive
    pub archive_size: u32,
    /// Format version (low 16 bits of the packed word)
    pub format_version: u16,
    /// Sector size shift (high 16 bits), sector size is `512 << block_size`
    pub block_size: u16,
    /// Offset to the hash table, relative to the header
    pub hash_table_pos: u32,
    /// Offset to the block table, relative to the header
    pub block_table_pos: u32,
    /// Number of entries in the hash table
    pub hash_table_size: u32,
    /// Number of entries in the block table
    pub block_table_size: u32,
}

impl MpqHeader {
    /// Parse a header starting at the beginning of `data`
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE as usize {
            return Err(Error::invalid_format(format!(
                "Header needs {} bytes, {} available",
                HEADER_SIZE,
                data.len()
            )));
        }

        let mut cursor = Cursor::new(data);
        let signature = cursor.read_u32::<LittleEndian>()?;
        if signature != MPQ_HEADER_SIGNATURE {
            return Err(Error::invalid_format(format!(
                "Bad header signature 0x{signature:08X}"
            )));
        }

        Ok(Self {
            header_size: cursor.read_u32::<LittleEndian>()?,
            archive_size: cursor.read_u32::<LittleEndian>()?,
            format_version: cursor.read_u16::<LittleEndian>()?,
            block_size: cursor.read_u16::<LittleEndian>()?,
            hash_table_pos: cursor.read_u32::<LittleEndian>()?,
            block_table_pos: cursor.read_u32::<LittleEndian>()?,
            hash_table_size: cursor.read_u32::<LittleEndian>()?,
            block_table_size: cursor.read_u32::<LittleEndian>()?,
        })
    }

    /// Serialize the header into the first 32 bytes of `out`
    pub fn write(&self, out: &mut [u8]) -> Result<()> {
        if out.len() < HEADER_SIZE as usize {
            return Err(Error::invalid_format("Output buffer too small for header"));
        }

        let mut cursor = Cursor::new(out);
        cursor.write_u32::<LittleEndian>(MPQ_HEADER_SIGNATURE)?;
        cursor.write_u32::<LittleEndian>(self.header_size)?;
        cursor.write_u32::<LittleEndian>(self.archive_size)?;
        cursor.write_u16::<LittleEndian>(self.format_version)?;
        cursor.write_u16::<LittleEndian>(self.block_size)?;
        cursor.write_u32::<LittleEndian>(self.hash_table_pos)?;
        cursor.write_u32::<LittleEndian>(self.block_table_pos)?;
        cursor.write_u32::<LittleEndian>(self.hash_table_size)?;
        cursor.write_u32::<LittleEndian>(self.block_table_size)?;
        Ok(())
    }

    /// Calculate the sector size from block size
    pub fn sector_size(&self) -> usize {
        crate::calculate_sector_size(self.block_size.min(MAX_SECTOR_SHIFT))
    }
}

fn has_signature_at(data: &[u8], offset: usize) -> bool {
    data.get(offset..offset + 4)
        .is_some_and(|sig| sig == MPQ_HEADER_SIGNATURE.to_le_bytes())
}

/// Find the MPQ header in a buffer, scanning every 512-byte boundary
pub fn find_header(data: &[u8]) -> Result<(usize, MpqHeader)> {
    for offset in (0..data.len()).step_by(HEADER_ALIGNMENT) {
        if !has_signature_at(data, offset) {
            continue;
        }

        match MpqHeader::from_bytes(&data[offset..]) {
            Ok(header) => return Ok((offset, header)),
            Err(e) => log::debug!("Skipping signature at 0x{offset:X}: {e}"),
        }
    }

    Err(Error::NoHeader)
}

/// Whether an MPQ signature sits on any 512-byte boundary of `data`
pub fn contains_archive(data: &[u8]) -> bool {
    (0..data.len())
        .step_by(HEADER_ALIGNMENT)
        .any(|offset| has_signature_at(data, offset))
}

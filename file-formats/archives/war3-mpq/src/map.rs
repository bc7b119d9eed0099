//! Warcraft III map containers
//!
//! A `.w3m`/`.w3x` map is an MPQ archive preceded by a 512-byte `HM3W`
//! header carrying the map name, flags and player count. Bare archives are
//! accepted as well; the header is then absent.

use crate::archive::{Archive, ArchiveFile};
use crate::header::HEADER_ALIGNMENT;
use crate::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use std::io::{BufRead, Cursor};

/// Map header signature
pub const MAP_SIGNATURE: &[u8; 4] = b"HM3W";

/// Whether the buffer starts with a map header
pub fn is_map(data: &[u8]) -> bool {
    data.starts_with(MAP_SIGNATURE)
}

/// The `HM3W` header in front of a map's archive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapHeader {
    /// Unknown field, usually zero
    pub unknown: u32,
    /// Map name as shown in the lobby
    pub name: String,
    /// Map flags
    pub flags: u32,
    /// Maximum number of players
    pub max_players: u32,
}

impl MapHeader {
    /// Parse a header from the start of a map file
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if !is_map(data) {
            return Err(Error::invalid_format("Missing HM3W map signature"));
        }

        let mut cursor = Cursor::new(&data[MAP_SIGNATURE.len()..]);
        let unknown = cursor.read_u32::<LittleEndian>()?;

        let mut name = Vec::new();
        cursor.read_until(0, &mut name)?;
        if name.pop() != Some(0) {
            return Err(Error::invalid_format("Unterminated map name"));
        }

        Ok(Self {
            unknown,
            name: String::from_utf8_lossy(&name).into_owned(),
            flags: cursor.read_u32::<LittleEndian>()?,
            max_players: cursor.read_u32::<LittleEndian>()?,
        })
    }

    /// Serialize the header, zero-padded to a multiple of 512 bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(HEADER_ALIGNMENT);
        out.extend_from_slice(MAP_SIGNATURE);
        out.write_u32::<LittleEndian>(self.unknown)?;
        out.extend_from_slice(self.name.as_bytes());
        out.push(0);
        out.write_u32::<LittleEndian>(self.flags)?;
        out.write_u32::<LittleEndian>(self.max_players)?;

        out.resize(out.len().next_multiple_of(HEADER_ALIGNMENT), 0);
        Ok(out)
    }
}

/// A map: optional `HM3W` header plus its archive
#[derive(Debug, Clone, Default)]
pub struct War3Map {
    header: Option<MapHeader>,
    archive: Archive,
}

impl War3Map {
    /// Wrap an archive, optionally with a header
    pub fn new(header: Option<MapHeader>, archive: Archive) -> Self {
        Self { header, archive }
    }

    /// Load a map or a bare archive
    pub fn load(buffer: impl Into<Bytes>, readonly: bool) -> Result<Self> {
        let data: Bytes = buffer.into();

        let header = if is_map(&data) {
            let header = MapHeader::from_bytes(&data)?;
            log::debug!(
                "Map \"{}\" for {} players, flags 0x{:08X}",
                header.name,
                header.max_players,
                header.flags
            );
            Some(header)
        } else {
            None
        };

        Ok(Self {
            header,
            archive: Archive::load(data, readonly)?,
        })
    }

    /// Serialize header and archive; `None` when the archive cannot be saved
    pub fn save(&mut self) -> Option<Vec<u8>> {
        let mut out = match &self.header {
            Some(header) => match header.to_bytes() {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::warn!("Failed to write map header: {}", e);
                    return None;
                }
            },
            None => Vec::new(),
        };

        out.extend_from_slice(&self.archive.save()?);
        Some(out)
    }

    /// The map header, if the map has one
    pub fn header(&self) -> Option<&MapHeader> {
        self.header.as_ref()
    }

    /// Replace or remove the map header
    pub fn set_header(&mut self, header: Option<MapHeader>) {
        self.header = header;
    }

    /// The embedded archive
    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    /// The embedded archive, mutably
    pub fn archive_mut(&mut self) -> &mut Archive {
        &mut self.archive
    }

    /// Look up a file by name
    pub fn get(&mut self, name: &str) -> Option<ArchiveFile<'_>> {
        self.archive.get(name)
    }

    /// Add or replace a file
    pub fn set(&mut self, name: &str, data: impl AsRef<[u8]>) -> bool {
        self.archive.set(name, data)
    }

    /// Check whether a file exists
    pub fn has(&self, name: &str) -> bool {
        self.archive.has(name)
    }

    /// Delete a file
    pub fn delete(&mut self, name: &str) -> bool {
        self.archive.delete(name)
    }

    /// Rename a file
    pub fn rename(&mut self, name: &str, new_name: &str) -> bool {
        self.archive.rename(name, new_name)
    }
}

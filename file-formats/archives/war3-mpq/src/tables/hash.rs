//! Hash table implementation for MPQ archives

use crate::crypto::{HASH_TABLE_KEY, decrypt_bytes, encrypt_bytes, hash_string, hash_type};
use crate::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;

/// Hash table entry (16 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashEntry {
    /// The hash of the full file name (part A)
    pub name_1: u32,
    /// The hash of the full file name (part B)
    pub name_2: u32,
    /// The language of the file (Windows LANGID)
    pub locale: u16,
    /// The platform the file is used for, `0xFFFF` marks a free slot
    pub platform: u16,
    /// Block table index or special value
    pub block_index: u32,
}

impl HashEntry {
    /// Size of one serialized entry
    pub const SIZE: usize = 16;
    /// Value indicating the hash entry has never been used
    pub const EMPTY_NEVER_USED: u32 = 0xFFFFFFFF;
    /// Value indicating the hash entry was deleted
    pub const EMPTY_DELETED: u32 = 0xFFFFFFFE;
    /// Platform value of slots that are free for insertion
    pub const FREE_PLATFORM: u16 = 0xFFFF;

    /// Create an empty hash entry
    pub fn empty() -> Self {
        Self {
            name_1: 0xFFFFFFFF,
            name_2: 0xFFFFFFFF,
            locale: 0xFFFF,
            platform: Self::FREE_PLATFORM,
            block_index: Self::EMPTY_NEVER_USED,
        }
    }

    /// Check if this entry has never been used
    pub fn is_empty(&self) -> bool {
        self.block_index == Self::EMPTY_NEVER_USED
    }

    /// Check if this entry was deleted
    pub fn is_deleted(&self) -> bool {
        self.block_index == Self::EMPTY_DELETED
    }

    /// Check if this entry contains valid file information
    pub fn is_valid(&self) -> bool {
        self.block_index < Self::EMPTY_DELETED
    }

    /// Check if insertion may claim this slot.
    ///
    /// Only the platform is tested, so tombstones are claimable as well.
    pub fn is_free(&self) -> bool {
        self.platform == Self::FREE_PLATFORM
    }

    /// Turn this entry into a tombstone
    pub fn delete(&mut self) {
        *self = Self {
            block_index: Self::EMPTY_DELETED,
            ..Self::empty()
        };
    }

    /// Read a hash entry from raw bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(Error::invalid_format("Hash entry too small"));
        }

        let mut cursor = Cursor::new(data);
        Ok(Self {
            name_1: cursor.read_u32::<LittleEndian>()?,
            name_2: cursor.read_u32::<LittleEndian>()?,
            locale: cursor.read_u16::<LittleEndian>()?,
            platform: cursor.read_u16::<LittleEndian>()?,
            block_index: cursor.read_u32::<LittleEndian>()?,
        })
    }

    fn write(&self, cursor: &mut Cursor<&mut [u8]>) -> Result<()> {
        cursor.write_u32::<LittleEndian>(self.name_1)?;
        cursor.write_u32::<LittleEndian>(self.name_2)?;
        cursor.write_u16::<LittleEndian>(self.locale)?;
        cursor.write_u16::<LittleEndian>(self.platform)?;
        cursor.write_u32::<LittleEndian>(self.block_index)?;
        Ok(())
    }
}

/// Hash table with linear probing
#[derive(Debug, Clone)]
pub struct HashTable {
    entries: Vec<HashEntry>,
}

impl Default for HashTable {
    fn default() -> Self {
        Self {
            entries: vec![HashEntry::empty(); crate::DEFAULT_HASH_TABLE_SIZE],
        }
    }
}

impl HashTable {
    /// Smallest size a table may be created or resized to
    pub const MIN_SIZE: usize = 4;

    /// Create a new empty hash table
    pub fn new(size: usize) -> Result<Self> {
        if size < Self::MIN_SIZE || !size.is_power_of_two() {
            return Err(Error::hash_table(format!(
                "Hash table size must be a power of 2 of at least {}, got {}",
                Self::MIN_SIZE,
                size
            )));
        }

        Ok(Self {
            entries: vec![HashEntry::empty(); size],
        })
    }

    /// Round a requested size up to a valid table size: a power of two, at least 4
    pub fn clamp_size(size: usize) -> Option<usize> {
        size.max(Self::MIN_SIZE).checked_next_power_of_two()
    }

    /// Decrypt and parse up to `count` entries from an encrypted table blob.
    ///
    /// The count is clamped to the number of whole entries in `data`.
    pub fn from_bytes(data: &[u8], count: usize) -> Result<Self> {
        let count = count.min(data.len() / HashEntry::SIZE);
        let mut raw_data = data[..count * HashEntry::SIZE].to_vec();
        decrypt_bytes(&mut raw_data, HASH_TABLE_KEY);

        let entries = raw_data
            .chunks_exact(HashEntry::SIZE)
            .map(HashEntry::from_bytes)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    /// Serialize and encrypt the table into `out`
    pub fn save(&self, out: &mut [u8]) -> Result<()> {
        let size = self.byte_size();
        if out.len() < size {
            return Err(Error::hash_table(format!(
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
        encrypt_bytes(out, HASH_TABLE_KEY);
        Ok(())
    }

    fn start_index(&self, filename: &str) -> usize {
        hash_string(filename, hash_type::TABLE_OFFSET) as usize & (self.entries.len() - 1)
    }

    /// Find the slot a new entry for `filename` would be written to
    pub fn insertion_index(&self, filename: &str) -> Option<usize> {
        let len = self.entries.len();
        if len == 0 {
            return None;
        }

        let start = self.start_index(filename);
        (0..len)
            .map(|step| (start + step) % len)
            .find(|&index| self.entries[index].is_free())
    }

    /// Insert `filename` pointing at `block_index`, returning the slot used.
    ///
    /// Returns `None` when the table is full.
    pub fn add(&mut self, filename: &str, block_index: u32) -> Option<usize> {
        let index = self.insertion_index(filename)?;

        self.entries[index] = HashEntry {
            name_1: hash_string(filename, hash_type::NAME_A),
            name_2: hash_string(filename, hash_type::NAME_B),
            locale: 0,
            platform: 0,
            block_index,
        };

        Some(index)
    }

    /// Find the slot holding `filename`.
    ///
    /// Probing stops at a never-used slot and continues past tombstones.
    pub fn find(&self, filename: &str) -> Option<usize> {
        let len = self.entries.len();
        if len == 0 {
            return None;
        }

        let name_a = hash_string(filename, hash_type::NAME_A);
        let name_b = hash_string(filename, hash_type::NAME_B);
        let start = self.start_index(filename);

        for step in 0..len {
            let index = (start + step) % len;
            let entry = &self.entries[index];

            if entry.name_1 == name_a && entry.name_2 == name_b {
                return Some(index);
            }

            if entry.is_empty() {
                return None;
            }
        }

        None
    }

    /// Find the entry holding `filename`
    pub fn find_entry(&self, filename: &str) -> Option<&HashEntry> {
        self.find(filename).map(|index| &self.entries[index])
    }

    /// Rebuild the table at `new_size`, reinserting every active entry by name.
    ///
    /// `name_of` supplies the real name of an active entry. Every active
    /// entry needs one, since placement is recomputed from the name rather
    /// than copied by slot. Returns `(old_slot, new_slot)` for each moved entry.
    pub fn resize<'a, F>(&mut self, new_size: usize, mut name_of: F) -> Result<Vec<(usize, usize)>>
    where
        F: FnMut(&HashEntry) -> Option<&'a str>,
    {
        let active = self.entries.iter().filter(|e| e.is_valid()).count();
        if new_size < active {
            return Err(Error::hash_table(format!(
                "Cannot shrink hash table to {} slots holding {} files",
                new_size, active
            )));
        }

        let mut resized = Self::new(new_size)?;
        let mut moves = Vec::with_capacity(active);

        for (old_index, entry) in self.entries.iter().enumerate() {
            if !entry.is_valid() {
                continue;
            }

            let name = name_of(entry).ok_or_else(|| {
                Error::hash_table(format!("Hash entry {} has no resolved name", old_index))
            })?;
            let new_index = resized
                .insertion_index(name)
                .ok_or_else(|| Error::hash_table("Resized hash table is full"))?;

            resized.entries[new_index] = *entry;
            moves.push((old_index, new_index));
        }

        *self = resized;
        Ok(moves)
    }

    /// Get all entries
    pub fn entries(&self) -> &[HashEntry] {
        &self.entries
    }

    /// Get mutable access to all entries
    pub fn entries_mut(&mut self) -> &mut [HashEntry] {
        &mut self.entries
    }

    /// Get a specific entry
    pub fn get(&self, index: usize) -> Option<&HashEntry> {
        self.entries.get(index)
    }

    /// Get a mutable reference to a specific entry
    pub fn get_mut(&mut self, index: usize) -> Option<&mut HashEntry> {
        self.entries.get_mut(index)
    }

    /// Get the size of the hash table
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no slots at all
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Size of the serialized table in bytes
    pub fn byte_size(&self) -> usize {
        self.entries.len() * HashEntry::SIZE
    }
}

//! Archive loading, saving and file management
//!
//! An [`Archive`] owns the hash table, the block table and one
//! [`MpqFile`] per block. Files are index-aligned with the block table;
//! hash entries point at blocks by index, so removing a block shifts every
//! later index down by one.
//!
//! ```no_run
//! use war3_mpq::Archive;
//!
//! # fn main() -> Result<(), war3_mpq::Error> {
//! let mut archive = Archive::open("Maps/DotA.w3x")?;
//!
//! if let Some(mut file) = archive.get("war3map.j") {
//!     let script = file.text().unwrap_or_default();
//!     file.set(script.replace("MaxHeroLevel", "HeroLevelCap"));
//! }
//!
//! archive.save_to("Maps/DotA-edited.w3x")?;
//! # Ok(())
//! # }
//! ```

use crate::file::{AddFileOptions, MpqFile};
use crate::header::{HEADER_SIZE, MAX_SECTOR_SHIFT, MpqHeader, find_header};
use crate::special_files::{ATTRIBUTES, LISTFILE, SIGNATURE, build_listfile, parse_listfile};
use crate::tables::{BlockEntry, BlockTable, HashEntry, HashTable};
use crate::{DEFAULT_SECTOR_SIZE, Error, Result};
use bytes::Bytes;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Options for opening or creating an archive
#[derive(Debug, Clone)]
pub struct OpenOptions {
    readonly: bool,
    sector_size: usize,
    hash_table_size: usize,
}

impl OpenOptions {
    /// Create new default options
    pub fn new() -> Self {
        Self {
            readonly: false,
            sector_size: DEFAULT_SECTOR_SIZE,
            hash_table_size: crate::DEFAULT_HASH_TABLE_SIZE,
        }
    }

    /// Open the archive in readonly mode.
    ///
    /// Readonly archives refuse every mutation and drop stored bytes once a
    /// file is decoded.
    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    /// Sector size of a created archive, a power of two of at least 512
    pub fn sector_size(mut self, sector_size: usize) -> Self {
        self.sector_size = sector_size;
        self
    }

    /// Hash table size of a created archive, rounded up to a power of two
    pub fn hash_table_size(mut self, size: usize) -> Self {
        self.hash_table_size = size;
        self
    }

    /// Load an archive from an in-memory buffer
    pub fn load(self, buffer: impl Into<Bytes>) -> Result<Archive> {
        Archive::load(buffer, self.readonly)
    }

    /// Read a whole file from disk and load it
    pub fn open<P: AsRef<Path>>(self, path: P) -> Result<Archive> {
        let data = fs::read(path.as_ref())?;
        log::debug!("Read {} bytes from {}", data.len(), path.as_ref().display());
        self.load(data)
    }

    /// Create an empty archive
    pub fn create(self) -> Result<Archive> {
        let valid_sector = self.sector_size.is_power_of_two()
            && self.sector_size >= crate::calculate_sector_size(0)
            && self.sector_size <= crate::calculate_sector_size(MAX_SECTOR_SHIFT);
        if !valid_sector {
            return Err(Error::invalid_format(format!(
                "Invalid sector size {}",
                self.sector_size
            )));
        }

        let size = HashTable::clamp_size(self.hash_table_size).ok_or_else(|| {
            Error::hash_table(format!("Hash table size {} too large", self.hash_table_size))
        })?;

        Ok(Archive {
            hash_table: HashTable::new(size)?,
            block_table: BlockTable::new(),
            files: Vec::new(),
            sector_size: self.sector_size,
            header_offset: 0,
            readonly: self.readonly,
        })
    }
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// An MPQ archive held entirely in memory
#[derive(Debug, Clone)]
pub struct Archive {
    hash_table: HashTable,
    block_table: BlockTable,
    files: Vec<Option<MpqFile>>,
    sector_size: usize,
    header_offset: usize,
    readonly: bool,
}

impl Default for Archive {
    fn default() -> Self {
        Self::new()
    }
}

fn table_slice(data: &[u8], header_offset: usize, pos: u32) -> &[u8] {
    header_offset
        .checked_add(pos as usize)
        .and_then(|start| data.get(start..))
        .unwrap_or_default()
}

impl Archive {
    /// Create an empty writable archive with default settings
    pub fn new() -> Self {
        Self {
            hash_table: HashTable::default(),
            block_table: BlockTable::new(),
            files: Vec::new(),
            sector_size: DEFAULT_SECTOR_SIZE,
            header_offset: 0,
            readonly: false,
        }
    }

    /// Read an archive from disk, writable
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        OpenOptions::new().open(path)
    }

    /// Load an archive from a buffer.
    ///
    /// Fails only when no MPQ header exists on any 512-byte boundary.
    /// Table sizes that do not fit the buffer are clamped.
    pub fn load(buffer: impl Into<Bytes>, readonly: bool) -> Result<Self> {
        let data: Bytes = buffer.into();
        let (header_offset, header) = find_header(&data)?;

        let hash_count = header.hash_table_size as usize;
        let block_count = (header.block_table_size as usize).min(hash_count);

        let hash_table = HashTable::from_bytes(
            table_slice(&data, header_offset, header.hash_table_pos),
            hash_count,
        )?;
        let block_table = BlockTable::from_bytes(
            table_slice(&data, header_offset, header.block_table_pos),
            block_count,
        )?;

        log::debug!(
            "MPQ header at 0x{:X}: {} hash entries, {} blocks, sector size {}",
            header_offset,
            hash_table.len(),
            block_table.len(),
            header.sector_size()
        );

        let mut files: Vec<Option<MpqFile>> = (0..block_table.len()).map(|_| None).collect();
        for (slot, entry) in hash_table.entries().iter().enumerate() {
            if !entry.is_valid() {
                continue;
            }
            let index = entry.block_index as usize;
            let Some(block) = block_table.get(index) else {
                log::debug!("Hash entry {} points past the block table", slot);
                continue;
            };

            let start = header_offset
                .saturating_add(block.file_pos as usize)
                .min(data.len());
            let end = start
                .saturating_add(block.compressed_size as usize)
                .min(data.len());
            files[index] = Some(MpqFile::from_raw(index, slot, data.slice(start..end)));
        }

        let mut archive = Self {
            hash_table,
            block_table,
            files,
            sector_size: header.sector_size(),
            header_offset,
            readonly,
        };

        for name in [LISTFILE, ATTRIBUTES, SIGNATURE] {
            archive.resolve(name);
        }

        if let Some(listfile) = archive.get(LISTFILE).and_then(|mut file| file.bytes()) {
            for name in parse_listfile(&listfile) {
                archive.resolve(&name);
            }
        }

        Ok(archive)
    }

    /// Find `name` and stamp it onto its file, returning the block index
    fn resolve(&mut self, name: &str) -> Option<usize> {
        let entry = self.hash_table.find_entry(name)?;
        if !entry.is_valid() {
            return None;
        }

        let index = entry.block_index as usize;
        let file = self.files.get_mut(index)?.as_mut()?;
        file.resolve_name(name);
        Some(index)
    }

    /// Look up a file by name
    pub fn get(&mut self, name: &str) -> Option<ArchiveFile<'_>> {
        let index = self.resolve(name)?;
        Some(ArchiveFile {
            archive: self,
            index,
        })
    }

    /// Check whether a file of this name exists
    pub fn has(&self, name: &str) -> bool {
        self.hash_table.find_entry(name).is_some_and(|entry| {
            entry.is_valid()
                && self
                    .files
                    .get(entry.block_index as usize)
                    .is_some_and(Option::is_some)
        })
    }

    /// Add or replace a file; `false` on readonly archives or a full hash table
    pub fn set(&mut self, name: &str, data: impl AsRef<[u8]>) -> bool {
        self.set_with_options(name, data, AddFileOptions::default())
    }

    /// Add or replace a file with a specific stored layout
    pub fn set_with_options(
        &mut self,
        name: &str,
        data: impl AsRef<[u8]>,
        options: AddFileOptions,
    ) -> bool {
        if self.readonly {
            log::warn!("Cannot set {}: archive is readonly", name);
            return false;
        }

        let data = Bytes::copy_from_slice(data.as_ref());

        if let Some(index) = self.resolve(name) {
            return self.set_file(index, data, options);
        }

        let index = self.block_table.len();
        let Some(slot) = self.hash_table.add(name, index as u32) else {
            log::warn!("Cannot add {}: hash table is full", name);
            return false;
        };

        self.block_table.add(data.len() as u32);
        self.files
            .push(Some(MpqFile::from_decoded(name, slot, data, options)));
        true
    }

    /// Delete a file; `false` if it does not exist
    pub fn delete(&mut self, name: &str) -> bool {
        self.get(name).is_some_and(ArchiveFile::delete)
    }

    /// Rename a file; `false` if it does not exist or the new name is taken
    pub fn rename(&mut self, name: &str, new_name: &str) -> bool {
        self.get(name).is_some_and(|mut file| file.rename(new_name))
    }

    fn set_file(&mut self, index: usize, data: Bytes, options: AddFileOptions) -> bool {
        if self.readonly {
            return false;
        }

        let Some(file) = self.files.get_mut(index).and_then(Option::as_mut) else {
            return false;
        };
        let (Some(hash), Some(block)) = (
            self.hash_table.get_mut(file.hash_index),
            self.block_table.get_mut(index),
        ) else {
            return false;
        };

        file.set(data, options, hash, block);
        true
    }

    fn hash_index_of(&self, index: usize) -> Option<usize> {
        self.files
            .get(index)
            .and_then(Option::as_ref)
            .map(|f| f.hash_index)
    }

    fn decode_file(&mut self, index: usize) -> Option<Bytes> {
        let file = self.files.get_mut(index)?.as_mut()?;
        let block = self.block_table.get(index)?;

        if file.decode(block, self.sector_size, self.readonly) {
            file.decoded().cloned()
        } else {
            None
        }
    }

    fn delete_file(&mut self, index: usize) -> bool {
        if self.readonly {
            log::warn!("Cannot delete block {}: archive is readonly", index);
            return false;
        }

        let Some(slot) = self.hash_index_of(index) else {
            return false;
        };
        if let Some(entry) = self.hash_table.get_mut(slot) {
            entry.delete();
        }
        self.remove_block(index);
        true
    }

    fn rename_file(&mut self, index: usize, new_name: &str) -> bool {
        if self.readonly {
            log::warn!("Cannot rename to {}: archive is readonly", new_name);
            return false;
        }

        let Some(old_slot) = self.hash_index_of(index) else {
            return false;
        };

        if let Some(existing) = self.hash_table.find(new_name) {
            if existing == old_slot {
                if let Some(file) = self.files[index].as_mut() {
                    file.resolve_name(new_name);
                }
                return true;
            }
            if self.hash_table.get(existing).is_some_and(HashEntry::is_valid) {
                log::warn!("Cannot rename to {}: name already in use", new_name);
                return false;
            }
        }

        // The key of an encrypted file derives from its name
        let encrypted = self.block_table.get(index).is_some_and(BlockEntry::is_encrypted);
        if encrypted && self.decode_file(index).is_none() {
            return false;
        }

        let Some(old) = self.hash_table.get(old_slot).copied() else {
            return false;
        };
        if let Some(entry) = self.hash_table.get_mut(old_slot) {
            entry.delete();
        }

        let Some(new_slot) = self.hash_table.add(new_name, index as u32) else {
            if let Some(entry) = self.hash_table.get_mut(old_slot) {
                *entry = old;
            }
            return false;
        };
        if let Some(entry) = self.hash_table.get_mut(new_slot) {
            entry.locale = old.locale;
            entry.platform = old.platform;
        }

        let (Some(file), Some(block)) = (
            self.files.get_mut(index).and_then(Option::as_mut),
            self.block_table.get_mut(index),
        ) else {
            return false;
        };
        if encrypted {
            file.invalidate_encoding(block);
        }
        file.resolve_name(new_name);
        file.hash_index = new_slot;
        true
    }

    /// Remove block `index` and its file, shifting later block indices down.
    ///
    /// Active hash entries pointing at the removed block are tombstoned.
    fn remove_block(&mut self, index: usize) {
        let removed = index as u32;
        for entry in self.hash_table.entries_mut() {
            if !entry.is_valid() {
                continue;
            }
            if entry.block_index == removed {
                entry.delete();
            } else if entry.block_index > removed {
                entry.block_index -= 1;
            }
        }

        self.block_table.remove(index);
        if index < self.files.len() {
            self.files.remove(index);
        }
    }

    /// Prune blocks that no hash entry references or that have no file
    /// behind them, returning the number of stored bytes released
    pub fn save_memory(&mut self) -> usize {
        let mut referenced = vec![false; self.block_table.len()];
        for entry in self.hash_table.entries().iter().filter(|e| e.is_valid()) {
            if let Some(flag) = referenced.get_mut(entry.block_index as usize) {
                *flag = true;
            }
        }

        let mut saved = 0;
        for index in (0..self.block_table.len()).rev() {
            let has_file = self.files.get(index).is_some_and(Option::is_some);
            if referenced[index] && has_file {
                continue;
            }

            saved += self
                .block_table
                .get(index)
                .map_or(0, |block| block.compressed_size as usize);
            self.remove_block(index);
        }

        if saved > 0 {
            log::debug!("Pruned unused blocks, {} bytes released", saved);
        }
        saved
    }

    /// Resize the hash table, reinserting every file by name.
    ///
    /// The size is rounded up to a power of two of at least 4. Refused when
    /// it is below the number of files or when any file name is unresolved.
    pub fn resize_hashtable(&mut self, size: usize) -> bool {
        if self.readonly {
            log::warn!("Cannot resize hash table: archive is readonly");
            return false;
        }

        let Some(size) = HashTable::clamp_size(size) else {
            log::warn!("Cannot resize hash table to {} entries", size);
            return false;
        };

        if size < self.len() {
            log::warn!(
                "Cannot resize hash table to {} entries holding {} files",
                size,
                self.len()
            );
            return false;
        }

        if let Some(file) = self.files().find(|f| !f.is_name_resolved()) {
            log::warn!("Cannot resize hash table: {} has no resolved name", file.name());
            return false;
        }

        let files = &self.files;
        let moves = self.hash_table.resize(size, |entry| {
            files
                .get(entry.block_index as usize)
                .and_then(Option::as_ref)
                .map(MpqFile::name)
        });

        match moves {
            Ok(moves) => {
                let moves: HashMap<usize, usize> = moves.into_iter().collect();
                for file in self.files.iter_mut().flatten() {
                    if let Some(&slot) = moves.get(&file.hash_index) {
                        file.hash_index = slot;
                    }
                }
                true
            }
            Err(e) => {
                log::warn!("Cannot resize hash table: {}", e);
                false
            }
        }
    }

    /// Serialize the archive; `None` when readonly or when a file cannot be placed.
    ///
    /// Drops `(attributes)`, prunes unused blocks and regenerates
    /// `(listfile)` before laying files out after the 32-byte header.
    pub fn save(&mut self) -> Option<Vec<u8>> {
        if self.readonly {
            log::warn!("Cannot save: archive is readonly");
            return None;
        }

        self.delete(ATTRIBUTES);
        self.save_memory();

        let listfile = build_listfile(
            self.files()
                .filter(|f| f.is_name_resolved() && f.name() != LISTFILE)
                .map(MpqFile::name),
        );
        if !self.set(LISTFILE, listfile) {
            log::warn!("Saving without a (listfile)");
        }

        let mut offset = HEADER_SIZE;
        for (index, slot) in self.files.iter_mut().enumerate() {
            let (Some(file), Some(block)) = (slot.as_mut(), self.block_table.get_mut(index))
            else {
                continue;
            };

            if !file.offset_changed(block, offset, self.sector_size) {
                return None;
            }
            if let Err(e) = file.encode(block, self.sector_size) {
                log::warn!("Failed to encode {}: {}", file.name(), e);
                return None;
            }
            offset = offset.checked_add(block.compressed_size)?;
        }

        let hash_table_pos = offset;
        let hash_table_len = u32::try_from(self.hash_table.byte_size()).ok()?;
        let block_table_len = u32::try_from(self.block_table.byte_size()).ok()?;
        let block_table_pos = hash_table_pos.checked_add(hash_table_len)?;
        let archive_size = block_table_pos.checked_add(block_table_len)?;

        let header = MpqHeader {
            header_size: HEADER_SIZE,
            archive_size,
            format_version: 0,
            block_size: (self.sector_size / 512).trailing_zeros() as u16,
            hash_table_pos,
            block_table_pos,
            hash_table_size: self.hash_table.len() as u32,
            block_table_size: self.block_table.len() as u32,
        };

        let mut out = vec![0u8; archive_size as usize];
        match self.write_archive(&header, &mut out) {
            Ok(()) => {
                log::debug!(
                    "Saved {} files in {} bytes ({} hash entries)",
                    self.len(),
                    out.len(),
                    self.hash_table.len()
                );
                Some(out)
            }
            Err(e) => {
                log::warn!("Failed to write archive: {}", e);
                None
            }
        }
    }

    fn write_archive(&self, header: &MpqHeader, out: &mut [u8]) -> Result<()> {
        header.write(out)?;

        for (file, block) in self.files.iter().zip(self.block_table.entries()) {
            let Some(raw) = file.as_ref().and_then(|f| f.data().raw()) else {
                continue;
            };
            let start = block.file_pos as usize;
            out.get_mut(start..start + raw.len())
                .ok_or_else(|| {
                    Error::block_table(format!("Block at 0x{start:X} overruns the archive"))
                })?
                .copy_from_slice(raw);
        }

        self.hash_table
            .save(&mut out[header.hash_table_pos as usize..])?;
        self.block_table
            .save(&mut out[header.block_table_pos as usize..])
    }

    /// Save the archive and write it to disk
    pub fn save_to<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        match self.save() {
            Some(data) => Ok(fs::write(path, data)?),
            None if self.readonly => Err(Error::ReadOnly),
            None => Err(Error::invalid_format("Archive could not be serialized")),
        }
    }

    /// Resolved file names in block order
    pub fn file_names(&self) -> Vec<&str> {
        self.files()
            .filter(|f| f.is_name_resolved())
            .map(MpqFile::name)
            .collect()
    }

    /// All files in block order
    pub fn files(&self) -> impl Iterator<Item = &MpqFile> {
        self.files.iter().flatten()
    }

    /// Number of files
    pub fn len(&self) -> usize {
        self.files().count()
    }

    /// Whether the archive holds no files
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sector size in bytes
    pub fn sector_size(&self) -> usize {
        self.sector_size
    }

    /// Offset of the MPQ header within the loaded buffer
    pub fn header_offset(&self) -> usize {
        self.header_offset
    }

    /// Whether the archive refuses mutation
    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    /// The hash table
    pub fn hash_table(&self) -> &HashTable {
        &self.hash_table
    }

    /// The block table
    pub fn block_table(&self) -> &BlockTable {
        &self.block_table
    }
}

/// A file of an [`Archive`], borrowed for reading or modification
#[derive(Debug)]
pub struct ArchiveFile<'a> {
    archive: &'a mut Archive,
    index: usize,
}

impl ArchiveFile<'_> {
    fn file(&self) -> Option<&MpqFile> {
        self.archive.files.get(self.index).and_then(Option::as_ref)
    }

    /// The file's name
    pub fn name(&self) -> &str {
        self.file().map_or("", MpqFile::name)
    }

    /// Whether the name is the real one rather than a placeholder
    pub fn is_name_resolved(&self) -> bool {
        self.file().is_some_and(MpqFile::is_name_resolved)
    }

    /// Index of the file in the block table
    pub fn block_index(&self) -> usize {
        self.index
    }

    /// The file's block entry
    pub fn block(&self) -> Option<&BlockEntry> {
        self.archive.block_table.get(self.index)
    }

    /// The file's hash entry
    pub fn hash(&self) -> Option<&HashEntry> {
        self.file()
            .and_then(|f| self.archive.hash_table.get(f.hash_index))
    }

    /// Decoded contents, `None` if decoding fails
    pub fn bytes(&mut self) -> Option<Bytes> {
        self.archive.decode_file(self.index)
    }

    /// Decoded contents as text, invalid UTF-8 replaced
    pub fn text(&mut self) -> Option<String> {
        self.bytes()
            .map(|data| String::from_utf8_lossy(&data).into_owned())
    }

    /// Replace the contents; `false` on readonly archives
    pub fn set(&mut self, data: impl AsRef<[u8]>) -> bool {
        self.set_with_options(data, AddFileOptions::default())
    }

    /// Replace the contents with a specific stored layout
    pub fn set_with_options(&mut self, data: impl AsRef<[u8]>, options: AddFileOptions) -> bool {
        self.archive
            .set_file(self.index, Bytes::copy_from_slice(data.as_ref()), options)
    }

    /// Remove the file from the archive
    pub fn delete(self) -> bool {
        self.archive.delete_file(self.index)
    }

    /// Move the file to a new name
    pub fn rename(&mut self, new_name: &str) -> bool {
        self.archive.rename_file(self.index, new_name)
    }
}

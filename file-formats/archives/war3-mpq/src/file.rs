//! Archive members and their on-disk encoding
//!
//! A [`MpqFile`] holds either the bytes stored in the archive, the bytes a
//! caller sees, or both. Decoding turns stored bytes into logical bytes
//! (decrypt, then decompress each sector); encoding goes the other way and
//! chooses the layout recorded in the file's [`BlockEntry`].
//!
//! Three layouts exist:
//!
//! - **Single unit**: the whole file is one blob, optionally compressed.
//! - **Sector table**: compressed files start with `sector_count + 1`
//!   little-endian offsets delimiting each stored sector.
//! - **Plain**: uncompressed files, split into sectors only for encryption.

use crate::compression::{self, CompressionMethod};
use crate::crypto::{decrypt_bytes, encrypt_bytes, file_key};
use crate::header::contains_archive;
use crate::map::MAP_SIGNATURE;
use crate::tables::{BlockEntry, HashEntry};
use crate::{Error, Result};
use bytes::Bytes;

/// Stored and logical representations of a file
#[derive(Debug, Clone)]
pub enum FileData {
    /// Bytes as stored in the archive, not decoded yet
    Raw(Bytes),
    /// Logical bytes, not encoded yet
    Decoded(Bytes),
    /// Stored bytes (first) together with their decoded form (second)
    Both(Bytes, Bytes),
}

impl FileData {
    /// The stored bytes, if present
    pub fn raw(&self) -> Option<&Bytes> {
        match self {
            Self::Raw(raw) | Self::Both(raw, _) => Some(raw),
            Self::Decoded(_) => None,
        }
    }

    /// The decoded bytes, if present
    pub fn decoded(&self) -> Option<&Bytes> {
        match self {
            Self::Decoded(decoded) | Self::Both(_, decoded) => Some(decoded),
            Self::Raw(_) => None,
        }
    }
}

/// How a newly set file is laid out when the archive is saved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddFileOptions {
    /// Encrypt the stored bytes
    pub encrypt: bool,
    /// Adjust the key by the file's offset and size (implies `encrypt`)
    pub fix_key: bool,
    /// Store the file as one blob instead of sectors
    pub single_unit: bool,
}

impl AddFileOptions {
    /// Default options: multi-sector, deflate, no encryption
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether the file is encrypted
    pub fn encrypt(mut self, encrypt: bool) -> Self {
        self.encrypt = encrypt;
        self
    }

    /// Set whether the key is adjusted by offset and size
    pub fn fix_key(mut self, fix_key: bool) -> Self {
        self.fix_key = fix_key;
        if fix_key {
            self.encrypt = true;
        }
        self
    }

    /// Set whether the file is stored as a single unit
    pub fn single_unit(mut self, single_unit: bool) -> Self {
        self.single_unit = single_unit;
        self
    }
}

#[derive(Debug, Clone, Copy)]
enum Cipher {
    Encrypt,
    Decrypt,
}

impl Cipher {
    fn apply(self, data: &mut [u8], key: u32) {
        match self {
            Self::Encrypt => encrypt_bytes(data, key),
            Self::Decrypt => decrypt_bytes(data, key),
        }
    }
}

fn read_offsets(table: &[u8]) -> Vec<usize> {
    table
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]) as usize)
        .collect()
}

fn sector_table_len(block: &BlockEntry, sector_size: usize) -> usize {
    ((block.file_size as usize).div_ceil(sector_size) + 1) * 4
}

fn sector_range(offsets: &[usize], index: usize, raw_len: usize) -> Result<(usize, usize)> {
    let (start, end) = (offsets[index], offsets[index + 1]);
    if start > end || end > raw_len {
        return Err(Error::invalid_format(format!(
            "Sector {} spans {}..{} outside {} stored bytes",
            index, start, end, raw_len
        )));
    }
    Ok((start, end))
}

/// Encrypt or decrypt stored bytes in place following the block's layout
fn crypt_layout(
    raw: &mut [u8],
    block: &BlockEntry,
    sector_size: usize,
    key: u32,
    cipher: Cipher,
) -> Result<()> {
    if block.is_single_unit() {
        cipher.apply(raw, key);
        return Ok(());
    }

    if !block.has_sector_table() {
        for (i, chunk) in raw.chunks_mut(sector_size).enumerate() {
            cipher.apply(chunk, key.wrapping_add(i as u32));
        }
        return Ok(());
    }

    let table_len = sector_table_len(block, sector_size);
    if raw.len() < table_len {
        return Err(Error::invalid_format(format!(
            "Sector offset table needs {} bytes, {} stored",
            table_len,
            raw.len()
        )));
    }

    // Offsets are read in plaintext, so decrypt before reading and encrypt after
    if let Cipher::Decrypt = cipher {
        cipher.apply(&mut raw[..table_len], key.wrapping_sub(1));
    }
    let offsets = read_offsets(&raw[..table_len]);
    if let Cipher::Encrypt = cipher {
        cipher.apply(&mut raw[..table_len], key.wrapping_sub(1));
    }

    for i in 0..offsets.len() - 1 {
        let (start, end) = sector_range(&offsets, i, raw.len())?;
        cipher.apply(&mut raw[start..end], key.wrapping_add(i as u32));
    }

    Ok(())
}

/// Whether the bytes are an archive or map of their own
fn is_nested_archive(data: &[u8]) -> bool {
    data.starts_with(MAP_SIGNATURE) || contains_archive(data)
}

/// Split into sectors, deflating each; falls back to the verbatim bytes
/// when the sector table and sectors together are not smaller
fn encode_sectors(data: &[u8], sector_size: usize) -> Result<(Vec<u8>, u32)> {
    let sectors = data
        .chunks(sector_size)
        .map(|chunk| compression::compress_sector(chunk, CompressionMethod::Deflate))
        .collect::<compression::CodecResult<Vec<_>>>()?;

    let table_len = (sectors.len() + 1) * 4;
    let total = table_len + sectors.iter().map(Vec::len).sum::<usize>();

    if total >= data.len() {
        return Ok((data.to_vec(), BlockEntry::FLAG_EXISTS));
    }

    let mut out = Vec::with_capacity(total);
    let mut offset = table_len;
    out.extend_from_slice(&(offset as u32).to_le_bytes());
    for sector in &sectors {
        offset += sector.len();
        out.extend_from_slice(&(offset as u32).to_le_bytes());
    }
    for sector in &sectors {
        out.extend_from_slice(sector);
    }

    Ok((out, BlockEntry::FLAG_EXISTS | BlockEntry::FLAG_COMPRESS))
}

/// A single archive member
#[derive(Debug, Clone)]
pub struct MpqFile {
    name: String,
    name_resolved: bool,
    pub(crate) hash_index: usize,
    data: FileData,
    options: AddFileOptions,
}

impl MpqFile {
    /// A member read from an archive, named by placeholder until resolved
    pub(crate) fn from_raw(block_index: usize, hash_index: usize, raw: Bytes) -> Self {
        Self {
            name: format!("File{block_index:08}"),
            name_resolved: false,
            hash_index,
            data: FileData::Raw(raw),
            options: AddFileOptions::default(),
        }
    }

    /// A member created from logical bytes
    pub(crate) fn from_decoded(
        name: &str,
        hash_index: usize,
        decoded: Bytes,
        options: AddFileOptions,
    ) -> Self {
        Self {
            name: name.to_string(),
            name_resolved: true,
            hash_index,
            data: FileData::Decoded(decoded),
            options,
        }
    }

    /// The file name, or a `FileXXXXXXXX` placeholder
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the name came from a lookup rather than a placeholder
    pub fn is_name_resolved(&self) -> bool {
        self.name_resolved
    }

    pub(crate) fn resolve_name(&mut self, name: &str) {
        if !self.name_resolved || self.name != name {
            self.name = name.to_string();
            self.name_resolved = true;
        }
    }

    /// Current representation of the file
    pub fn data(&self) -> &FileData {
        &self.data
    }

    /// Decoded bytes, if already available
    pub fn decoded(&self) -> Option<&Bytes> {
        self.data.decoded()
    }

    fn key(&self, block: &BlockEntry) -> Result<u32> {
        if self.name_resolved {
            Ok(file_key(&self.name, block))
        } else {
            Err(Error::crypto(format!(
                "{} is encrypted and its real name is unknown",
                self.name
            )))
        }
    }

    /// Replace the contents, resetting the hash and block entries
    pub(crate) fn set(
        &mut self,
        decoded: Bytes,
        options: AddFileOptions,
        hash: &mut HashEntry,
        block: &mut BlockEntry,
    ) {
        hash.locale = 0;
        hash.platform = 0;
        *block = BlockEntry::new(decoded.len() as u32);
        self.data = FileData::Decoded(decoded);
        self.options = options;
    }

    /// Forget the stored bytes of a decoded file so the next save encodes it
    /// again with the same layout and encryption. Used when the key changes
    /// with the name.
    pub(crate) fn invalidate_encoding(&mut self, block: &mut BlockEntry) -> bool {
        let decoded = match &self.data {
            FileData::Both(_, decoded) => decoded.clone(),
            FileData::Decoded(_) => return true,
            FileData::Raw(_) => return false,
        };

        self.options = AddFileOptions {
            encrypt: block.is_encrypted(),
            fix_key: block.has_fix_key(),
            single_unit: block.is_single_unit(),
        };
        *block = BlockEntry::new(decoded.len() as u32);
        self.data = FileData::Decoded(decoded);
        true
    }

    /// Decode the stored bytes if needed; `false` when decoding fails.
    ///
    /// Readonly archives drop the stored bytes once decoded.
    pub(crate) fn decode(
        &mut self,
        block: &BlockEntry,
        sector_size: usize,
        readonly: bool,
    ) -> bool {
        let raw = match &self.data {
            FileData::Raw(raw) => raw.clone(),
            FileData::Decoded(_) | FileData::Both(..) => return true,
        };

        match self.decode_raw(&raw, block, sector_size) {
            Ok(decoded) => {
                let decoded = Bytes::from(decoded);
                self.data = if readonly {
                    FileData::Decoded(decoded)
                } else {
                    FileData::Both(raw, decoded)
                };
                true
            }
            Err(e) if e.is_corruption() => {
                log::warn!("{} is corrupt: {}", self.name, e);
                false
            }
            Err(e) => {
                log::warn!("Cannot decode {}: {}", self.name, e);
                false
            }
        }
    }

    fn decode_raw(&self, raw: &[u8], block: &BlockEntry, sector_size: usize) -> Result<Vec<u8>> {
        let file_size = block.file_size as usize;

        if block.flags == BlockEntry::FLAG_EXISTS {
            return raw
                .get(..file_size)
                .map(<[u8]>::to_vec)
                .ok_or(Error::SizeMismatch {
                    expected: file_size,
                    actual: raw.len(),
                });
        }

        if file_size == 0 {
            return Ok(Vec::new());
        }

        let mut data = raw.to_vec();
        if block.is_encrypted() {
            crypt_layout(&mut data, block, sector_size, self.key(block)?, Cipher::Decrypt)?;
        }

        if block.is_single_unit() {
            return if block.is_compressed() {
                Ok(compression::decompress(&data, file_size)?)
            } else if block.is_imploded() {
                Ok(compression::decompress_imploded(&data, file_size)?)
            } else {
                truncate_to(data, file_size)
            };
        }

        if !block.has_sector_table() {
            return truncate_to(data, file_size);
        }

        let table_len = sector_table_len(block, sector_size);
        let offsets = read_offsets(&data[..table_len.min(data.len())]);
        if offsets.len() * 4 < table_len {
            return Err(Error::invalid_format("Truncated sector offset table"));
        }

        let mut out = Vec::with_capacity(file_size);
        for i in 0..offsets.len() - 1 {
            let (start, end) = sector_range(&offsets, i, data.len())?;
            let expected = (file_size - out.len()).min(sector_size);
            let sector = &data[start..end];

            log::trace!("{} sector {}: {} -> {} bytes", self.name, i, sector.len(), expected);
            let decoded = if block.is_imploded() {
                compression::decompress_imploded(sector, expected)?
            } else {
                compression::decompress(sector, expected)?
            };
            out.extend_from_slice(&decoded);
        }

        Ok(out)
    }

    /// Encode decoded bytes into their stored form.
    ///
    /// Does nothing when stored bytes already exist. The block's offset must
    /// already be final, since offset-adjusted keys depend on it.
    pub(crate) fn encode(&mut self, block: &mut BlockEntry, sector_size: usize) -> Result<()> {
        let decoded = match &self.data {
            FileData::Decoded(decoded) => decoded.clone(),
            FileData::Raw(_) | FileData::Both(..) => return Ok(()),
        };

        block.file_size = decoded.len() as u32;

        let (mut raw, mut flags) = if is_nested_archive(&decoded) {
            (decoded.to_vec(), BlockEntry::FLAG_EXISTS)
        } else if self.options.single_unit {
            let stored = compression::compress_sector(&decoded, CompressionMethod::Deflate)?;
            let mut flags = BlockEntry::FLAG_EXISTS | BlockEntry::FLAG_SINGLE_UNIT;
            if stored.len() < decoded.len() {
                flags |= BlockEntry::FLAG_COMPRESS;
            }
            (stored, flags)
        } else {
            encode_sectors(&decoded, sector_size)?
        };

        if self.options.encrypt || self.options.fix_key {
            flags |= BlockEntry::FLAG_ENCRYPTED;
            if self.options.fix_key {
                flags |= BlockEntry::FLAG_FIX_KEY;
            }
            block.flags = flags;
            let key = file_key(&self.name, block);
            crypt_layout(&mut raw, block, sector_size, key, Cipher::Encrypt)?;
        }

        block.flags = flags;
        block.compressed_size = raw.len() as u32;
        self.data = FileData::Both(Bytes::from(raw), decoded);
        Ok(())
    }

    /// Move the file to `new_offset`; `false` when it cannot be re-keyed
    pub(crate) fn offset_changed(
        &mut self,
        block: &mut BlockEntry,
        new_offset: u32,
        sector_size: usize,
    ) -> bool {
        if block.file_pos != new_offset && block.has_fix_key() && block.is_encrypted() {
            if !self.name_resolved {
                log::warn!(
                    "Cannot move {}: its key depends on the offset and its name is unknown",
                    self.name
                );
                return false;
            }

            return match self.re_encrypt(block, new_offset, sector_size) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Failed to re-encrypt {}: {}", self.name, e);
                    false
                }
            };
        }

        block.file_pos = new_offset;
        true
    }

    /// Swap the encryption layer from the key at the old offset to the key
    /// at `new_offset`, leaving the compressed content alone
    pub(crate) fn re_encrypt(
        &mut self,
        block: &mut BlockEntry,
        new_offset: u32,
        sector_size: usize,
    ) -> Result<()> {
        let raw = self
            .data
            .raw()
            .ok_or_else(|| Error::crypto(format!("{} has no stored bytes", self.name)))?;

        let mut moved = *block;
        moved.file_pos = new_offset;
        let old_key = self.key(block)?;
        let new_key = self.key(&moved)?;

        let mut data = raw.to_vec();
        crypt_layout(&mut data, block, sector_size, old_key, Cipher::Decrypt)?;
        crypt_layout(&mut data, &moved, sector_size, new_key, Cipher::Encrypt)?;

        let data = Bytes::from(data);
        self.data = match self.data.decoded() {
            Some(decoded) => FileData::Both(data, decoded.clone()),
            None => FileData::Raw(data),
        };
        *block = moved;
        Ok(())
    }
}

fn truncate_to(mut data: Vec<u8>, size: usize) -> Result<Vec<u8>> {
    if data.len() < size {
        return Err(Error::SizeMismatch {
            expected: size,
            actual: data.len(),
        });
    }
    data.truncate(size);
    Ok(data)
}

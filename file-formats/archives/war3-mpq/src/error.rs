//! Error types for the MPQ library

use crate::compression::CodecError;
use std::io;
use thiserror::Error;

/// Result type alias for MPQ operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for MPQ operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No MPQ header on any 512-byte boundary of the buffer
    #[error("No MPQ header found")]
    NoHeader,

    /// Invalid MPQ format or corrupted archive
    #[error("Invalid MPQ format: {0}")]
    InvalidFormat(String),

    /// Hash table error
    #[error("Hash table error: {0}")]
    HashTable(String),

    /// Block table error
    #[error("Block table error: {0}")]
    BlockTable(String),

    /// Encryption/decryption error
    #[error("Cryptography error: {0}")]
    Crypto(String),

    /// A sector codec failed or is not supported
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Decoded data does not have the size recorded in the block table
    #[error("Size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Size recorded in the block table
        expected: usize,
        /// Size actually produced
        actual: usize,
    },

    /// Archive is read-only
    #[error("Archive is read-only")]
    ReadOnly,
}

impl Error {
    /// Create a new InvalidFormat error
    pub fn invalid_format<S: Into<String>>(msg: S) -> Self {
        Error::InvalidFormat(msg.into())
    }

    /// Create a new Crypto error
    pub fn crypto<S: Into<String>>(msg: S) -> Self {
        Error::Crypto(msg.into())
    }

    /// Create a new HashTable error
    pub fn hash_table<S: Into<String>>(msg: S) -> Self {
        Error::HashTable(msg.into())
    }

    /// Create a new BlockTable error
    pub fn block_table<S: Into<String>>(msg: S) -> Self {
        Error::BlockTable(msg.into())
    }

    /// Whether the error means stored bytes are damaged, as opposed to
    /// a missing codec, a missing name or a refused operation
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::NoHeader
                | Error::InvalidFormat(_)
                | Error::BlockTable(_)
                | Error::SizeMismatch { .. }
                | Error::Codec(
                    CodecError::Corrupt { .. }
                        | CodecError::UnknownMask(_)
                        | CodecError::Empty
                        | CodecError::SizeMismatch { .. }
                )
        )
    }
}

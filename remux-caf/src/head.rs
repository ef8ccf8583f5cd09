//! The CAF file header.
//!
//! Unlike every other structure in a CAF file, the file header is a
//! bare 8 bytes: the `caff` file type tag, a version, and flags. It
//! carries no size field.

use byteorder::{BigEndian, ByteOrder};
use remux_core::error::ChunkError;

use crate::error::Result;

/// The `caff` file type tag.
pub const FILE_TYPE: [u8; 4] = *b"caff";

/// Size of the encoded file header.
pub const FILE_HEADER_SIZE: usize = 8;

/// The 8-byte CAF file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// File version; 1 for current CAF files.
    pub file_version: u16,
    /// File flags; reserved, 0 in current CAF files.
    pub file_flags: u16,
}

impl FileHeader {
    /// A version 1 header with no flags.
    pub fn v1() -> Self {
        Self {
            file_version: 1,
            file_flags: 0,
        }
    }

    /// Decode a file header from the front of `data`.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < FILE_HEADER_SIZE {
            return Err(ChunkError::Truncated {
                declared: FILE_HEADER_SIZE as u64,
                available: data.len(),
            });
        }
        if data[..4] != FILE_TYPE {
            return Err(ChunkError::FileType);
        }
        Ok(Self {
            file_version: BigEndian::read_u16(&data[4..6]),
            file_flags: BigEndian::read_u16(&data[6..8]),
        })
    }

    /// Encode this header into 8 bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(FILE_HEADER_SIZE);
        out.extend_from_slice(&FILE_TYPE);
        out.extend_from_slice(&self.file_version.to_be_bytes());
        out.extend_from_slice(&self.file_flags.to_be_bytes());
        out
    }
}
